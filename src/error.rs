//! Error handling for AuraFX
//!
//! Every failure the core can surface to a collaborator goes through
//! [`FxError`]. Numeric input problems are not errors: they are recovered
//! locally (see [`crate::scene::edit`]).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for AuraFX operations
pub type Result<T> = std::result::Result<T, FxError>;

/// Main error type for AuraFX operations
#[derive(Error, Debug)]
pub enum FxError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Scene Errors
    #[error("Invalid scene document: {reason}")]
    InvalidScene { reason: String },

    #[error("Invalid color '{value}' (expected #rrggbb)")]
    InvalidColor { value: String },

    #[error("Layer index {index} out of range ({len} layers)")]
    LayerNotFound { index: usize, len: usize },

    #[error("Element index {index} out of range in layer '{layer}'")]
    ElementNotFound { layer: String, index: usize },

    // Undo/Redo Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Import Errors
    #[error("OBJ parse error on line {line}: {reason}")]
    ObjParse { line: usize, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // Compile Errors
    #[error("Emission failed for layer '{layer}': {reason}")]
    EmissionFault { layer: String, reason: String },

    #[error("Non-finite coordinate for element {element} of layer '{layer}'")]
    NonFiniteCoordinate { layer: String, element: usize },

    // Job Errors
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background worker stopped unexpectedly")]
    WorkerDisconnected,

    #[error("Scene lock poisoned")]
    LockPoisoned,

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FxError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::FileNotFound { .. } => "FILE_NOT_FOUND",
            FxError::FileReadError { .. } => "FILE_READ_ERROR",
            FxError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            FxError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            FxError::InvalidScene { .. } => "INVALID_SCENE",
            FxError::InvalidColor { .. } => "INVALID_COLOR",
            FxError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            FxError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            FxError::NothingToUndo => "NOTHING_TO_UNDO",
            FxError::NothingToRedo => "NOTHING_TO_REDO",
            FxError::ObjParse { .. } => "OBJ_PARSE_ERROR",
            FxError::Image(_) => "IMAGE_ERROR",
            FxError::EmissionFault { .. } => "EMISSION_FAULT",
            FxError::NonFiniteCoordinate { .. } => "NON_FINITE_COORDINATE",
            FxError::Cancelled => "CANCELLED",
            FxError::WorkerDisconnected => "WORKER_DISCONNECTED",
            FxError::LockPoisoned => "LOCK_POISONED",
            FxError::Json(_) => "JSON_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FxError::FileNotFound { .. }
                | FxError::InvalidColor { .. }
                | FxError::NothingToUndo
                | FxError::NothingToRedo
                | FxError::Cancelled
                | FxError::NonFiniteCoordinate { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FxError::FileNotFound { .. } => Some("Check the file path and try again."),
            FxError::InvalidScene { .. } => {
                Some("The scene file may be damaged. Try the latest autosave.")
            }
            FxError::InvalidColor { .. } => Some("Use a six digit hex color such as #ff8800."),
            FxError::NothingToUndo => Some("There are no actions to undo."),
            FxError::NothingToRedo => Some("There are no undone actions to redo."),
            FxError::NonFiniteCoordinate { .. } => {
                Some("Move or delete the element with the broken position and compile again.")
            }
            FxError::Cancelled => Some("Start the operation again to finish it."),
            _ => None,
        }
    }
}
