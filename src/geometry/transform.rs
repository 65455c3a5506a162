//! Frame and coordinate transforms
//!
//! Pure functions behind the animated compile modes. Given a speed control
//! they derive how many frames an animation has and how long each frame
//! lasts; given a frame index they place a point.

use std::f64::consts::TAU;

use crate::scene::Position;

/// Fewest frames an animation is ever split into.
pub const MIN_FRAMES: usize = 10;

/// Fixed tick delay before each step of a standalone rise.
pub const RISE_STEP_DELAY: u32 = 3;

/// Most steps a standalone rise may take. Slower rises are rejected.
pub const MAX_RISE_STEPS: usize = 1000;

/// Speed as used in divisors and frame maths: finite and at least 1.
#[inline]
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.max(1.0)
    } else {
        1.0
    }
}

/// `max(10, floor(120 - speed * 1.1))`.
pub fn frame_count(speed: f64) -> usize {
    let frames = (120.0 - clamp_speed(speed) * 1.1).floor();
    if frames < MIN_FRAMES as f64 {
        MIN_FRAMES
    } else {
        frames as usize
    }
}

/// `clamp(10 - (speed - 1) * 4/99, 1, 10)` ticks.
pub fn frame_delay(speed: f64) -> f64 {
    let speed = clamp_speed(speed);
    (10.0 - (speed - 1.0) * (4.0 / 99.0)).clamp(1.0, 10.0)
}

/// Frame count and per-frame delay for one animated layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub frames: usize,
    pub delay: f64,
}

impl FramePlan {
    pub fn for_speed(speed: f64) -> Self {
        Self {
            frames: frame_count(speed),
            delay: frame_delay(speed),
        }
    }

    /// Angle added per frame so that the last frame closes the circle.
    pub fn angle_step(&self) -> f64 {
        TAU / self.frames as f64
    }

    /// Delay rendered the way delay commands expect it.
    pub fn delay_text(&self) -> String {
        format!("{:.2}", self.delay)
    }
}

/// Rotate `p` by `theta` radians about the scene origin.
///
/// `x' = x·cos θ − z·sin θ`, `z' = x·sin θ + z·cos θ`.
#[inline]
pub fn rotate_about_origin(p: Position, theta: f64) -> Position {
    let (sin, cos) = theta.sin_cos();
    Position::new(p.x * cos - p.z * sin, p.x * sin + p.z * cos)
}

/// Offset of an orbiting point at `frame`.
///
/// The phase advances `speed` degrees per frame. The raw speed is used
/// here, not the clamped one.
#[inline]
pub fn orbit_offset(radius: f64, speed: f64, frame: usize) -> Position {
    let phi = frame as f64 * speed.to_radians();
    Position::new(radius * phi.cos(), radius * phi.sin())
}

/// `p` displaced by its orbit offset at `frame`.
#[inline]
pub fn orbit(p: Position, radius: f64, speed: f64, frame: usize) -> Position {
    let offset = orbit_offset(radius, speed, frame);
    Position::new(p.x + offset.x, p.z + offset.z)
}

/// True when rise parameters can drive a rise: both positive and finite,
/// and reaching `limit` in at most [`MAX_RISE_STEPS`] steps.
pub fn rise_is_valid(speed: f64, limit: f64) -> bool {
    speed.is_finite()
        && limit.is_finite()
        && speed > 0.0
        && limit > 0.0
        && limit / speed <= MAX_RISE_STEPS as f64
}

/// Heights of a standalone rise: `0, speed, 2·speed, …` up to `limit`.
///
/// Returns `None` when the parameters fail [`rise_is_valid`].
pub fn rise_heights(speed: f64, limit: f64) -> Option<impl Iterator<Item = f64>> {
    if !rise_is_valid(speed, limit) {
        return None;
    }
    let steps = (limit / speed).floor() as usize;
    Some(
        (0..=steps)
            .map(move |i| i as f64 * speed)
            .filter(move |h| *h <= limit + 1e-9),
    )
}

/// Cumulative height bias for a rise running under global rotation.
///
/// Starts at zero, grows by `speed` per frame and saturates at `limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseAccumulator {
    current: f64,
    speed: f64,
    limit: f64,
}

impl RiseAccumulator {
    pub fn new(speed: f64, limit: f64) -> Self {
        Self {
            current: 0.0,
            speed,
            limit,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn advance(&mut self) {
        self.current = (self.current + self.speed).min(self.limit);
    }
}
