//! Effect Script Compiler
//!
//! Turns a layer snapshot into a timed command script:
//! - `options`: skill name, command kind and mode flags
//! - `command`: line formatting
//! - `emitter`: per-layer strategy dispatch, progress and cancellation
//! - `optimizer`: run-length merging of identical lines

pub mod command;
pub mod emitter;
pub mod optimizer;
pub mod options;

pub use command::{CommandKind, CommandTemplate, CLOUD_DURATION, PERSISTENT_CLOUD_DURATION};
pub use emitter::{compile, CompileOutput, CompileWarning, Compiler, Progress};
pub use optimizer::optimize_lines;
pub use options::{
    Animation, CompileOptions, EffectKind, LocalRotateSettings, ModeSettings, ProximitySettings,
    RiseSettings, RotateSettings, DEFAULT_SKILL_NAME,
};
