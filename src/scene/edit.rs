//! Explicit layer setters
//!
//! The editor never writes layer fields directly. It builds a [`LayerEdit`]
//! and hands it to [`Scene::edit_layer`](super::Scene::edit_layer), which
//! applies it and records a history snapshot.
//!
//! Raw text from input fields goes through [`LayerEdit::from_input`]: a value
//! that fails to parse falls back to the layer's current value instead of
//! failing.

use std::str::FromStr;

use tracing::debug;

use super::layer::Layer;
use super::targeter::Targeter;

/// Parse `raw`, or keep `last` if it does not parse.
pub fn parse_or_keep<T: FromStr>(raw: &str, last: T) -> T {
    raw.trim().parse().unwrap_or(last)
}

/// Like [`parse_or_keep`] but also rejects NaN and infinities.
pub fn parse_finite_or_keep(raw: &str, last: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => last,
    }
}

/// A single typed change to a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEdit {
    Name(String),
    Visible(bool),
    TickStart(i64),
    TickEnd(i64),
    TickDelay(i64),
    Particle(String),
    Alpha(f64),
    ShapeSize(f64),
    Repeat(u32),
    RepeatInterval(u32),
    YOffset(f64),
    Targeter(Targeter),
}

impl LayerEdit {
    /// Build an edit from a named input field and its raw text.
    ///
    /// Returns `None` for unknown field names. Color is not handled here;
    /// it goes through [`Scene::set_layer_color`](super::Scene::set_layer_color)
    /// so that elements are re-colored too.
    pub fn from_input(field: &str, raw: &str, layer: &Layer) -> Option<Self> {
        let edit = match field {
            "name" => LayerEdit::Name(raw.to_string()),
            "visible" => LayerEdit::Visible(parse_or_keep(raw, layer.visible)),
            "tick_start" => LayerEdit::TickStart(parse_or_keep(raw, layer.tick_start)),
            "tick_end" => LayerEdit::TickEnd(parse_or_keep(raw, layer.tick_end)),
            "tick_delay" => LayerEdit::TickDelay(parse_or_keep(raw, layer.tick_delay)),
            "particle" => LayerEdit::Particle(raw.trim().to_string()),
            "alpha" => LayerEdit::Alpha(parse_finite_or_keep(raw, layer.alpha)),
            "shape_size" => LayerEdit::ShapeSize(parse_finite_or_keep(raw, layer.shape_size)),
            "repeat" => LayerEdit::Repeat(parse_or_keep(raw, layer.repeat)),
            "repeat_interval" => {
                LayerEdit::RepeatInterval(parse_or_keep(raw, layer.repeat_interval))
            }
            "y_offset" => LayerEdit::YOffset(parse_finite_or_keep(raw, layer.y_offset)),
            "targeter" => LayerEdit::Targeter(Targeter::parse(raw)),
            _ => {
                debug!(field, "ignoring edit for unknown layer field");
                return None;
            }
        };
        Some(edit)
    }

    /// Short label used in history descriptions.
    pub fn field_name(&self) -> &'static str {
        match self {
            LayerEdit::Name(_) => "name",
            LayerEdit::Visible(_) => "visible",
            LayerEdit::TickStart(_) => "tick_start",
            LayerEdit::TickEnd(_) => "tick_end",
            LayerEdit::TickDelay(_) => "tick_delay",
            LayerEdit::Particle(_) => "particle",
            LayerEdit::Alpha(_) => "alpha",
            LayerEdit::ShapeSize(_) => "shape_size",
            LayerEdit::Repeat(_) => "repeat",
            LayerEdit::RepeatInterval(_) => "repeat_interval",
            LayerEdit::YOffset(_) => "y_offset",
            LayerEdit::Targeter(_) => "targeter",
        }
    }

    /// Apply to `layer`, clamping values into their valid ranges.
    pub fn apply(self, layer: &mut Layer) {
        match self {
            LayerEdit::Name(name) => layer.name = name,
            LayerEdit::Visible(visible) => layer.visible = visible,
            LayerEdit::TickStart(t) => layer.tick_start = t,
            LayerEdit::TickEnd(t) => layer.tick_end = t,
            LayerEdit::TickDelay(t) => layer.tick_delay = t,
            LayerEdit::Particle(p) => layer.particle = p,
            LayerEdit::Alpha(a) => layer.alpha = a,
            LayerEdit::ShapeSize(s) => layer.shape_size = s,
            LayerEdit::Repeat(r) => layer.repeat = r,
            LayerEdit::RepeatInterval(r) => layer.repeat_interval = r,
            LayerEdit::YOffset(y) => layer.y_offset = y,
            LayerEdit::Targeter(t) => layer.targeter = t,
        }
        layer.normalize();
    }
}
