//! Geometry Module
//!
//! Stateless transforms used by the compiler:
//! - frame planning and per-frame placement for the rotation and rise modes
//! - the nearest-neighbour tour used by proximity mode

pub mod tour;
pub mod transform;

pub use tour::{proximity_order, proximity_tour};
pub use transform::{
    clamp_speed, frame_count, frame_delay, orbit, orbit_offset, rise_heights, rise_is_valid,
    rotate_about_origin, FramePlan, RiseAccumulator, MAX_RISE_STEPS, MIN_FRAMES,
    RISE_STEP_DELAY,
};
