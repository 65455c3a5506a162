//! State Management Module
//!
//! Background persistence of the live scene: periodic autosave with
//! rotation of old backups.

pub mod autosave;

pub use autosave::{spawn_autosave_loop, AutosaveLoop, AutosaveManager, AutosaveSettings};
