//! AuraFX - Particle Effect Authoring Core
//!
//! AuraFX turns a layered scene of 2D points into a timed effect script
//! for a game scripting engine.
//!
//! # Architecture
//!
//! - `scene`: layers, elements, undo/redo history and the `.fxgen` document
//! - `import`: element providers (shape tools, OBJ meshes, raster images)
//! - `geometry`: rotation, orbit, rise and proximity-tour math
//! - `script`: the compiler that emits and optimizes script lines
//! - `jobs`: compilation and imports on worker threads
//! - `state`: autosave of the live scene
//! - `preview`: flat point feed for a 3D viewer

pub mod cli;
pub mod color;
pub mod error;
pub mod geometry;
pub mod import;
pub mod jobs;
pub mod preview;
pub mod scene;
pub mod script;
pub mod state;

pub use error::{FxError, Result};
pub use jobs::{spawn_compile, spawn_import, CompileJob, ImportJob};
pub use scene::{Element, ElementKind, Layer, Scene, SceneDocument, SharedScene};
pub use script::{compile, CompileOptions, CompileOutput, CompileWarning, Compiler, Progress};
