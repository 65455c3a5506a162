//! Color helpers
//!
//! Colors travel through the system as `#rrggbb` strings, which is what the
//! target scripting dialect expects.

use crate::error::{FxError, Result};

/// Hue advance per emitted element in rainbow mode.
pub const RAINBOW_HUE_STEP: f64 = 0.02;

/// True if `value` is `#` followed by exactly six hex digits.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate and lowercase a `#rrggbb` color.
pub fn normalize_hex(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_hex_color(trimmed) {
        return Err(FxError::InvalidColor {
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Decode `#rrggbb` (leading `#` optional) into components.
pub fn hex_to_rgb(value: &str) -> Result<(u8, u8, u8)> {
    let digits = value.trim().trim_start_matches('#');
    let invalid = || FxError::InvalidColor {
        value: value.to_string(),
    };
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// HSV to RGB with all components in `[0, 1]`.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Fully saturated, full value color for `hue` in `[0, 1)`.
///
/// Channels are truncated, not rounded, when scaled to 0..=255.
pub fn hue_to_hex(hue: f64) -> String {
    let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
    let scale = |c: f64| (c * 255.0) as u8;
    rgb_to_hex(scale(r), scale(g), scale(b))
}

/// Running hue counter for rainbow mode.
///
/// One cycle is shared by a whole compilation, so the palette keeps
/// flowing across layer boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RainbowCycle {
    hue: f64,
}

impl RainbowCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Color for the current hue, then advance.
    pub fn next_color(&mut self) -> String {
        let color = hue_to_hex(self.hue);
        self.hue = (self.hue + RAINBOW_HUE_STEP) % 1.0;
        color
    }
}
