//! Error types for the vocabulary export pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The vocabulary source could not be opened or initialized
    #[error("Vocabulary source '{name}' is unavailable: {reason}")]
    ProviderUnavailable { name: String, reason: String },

    /// The canonical store file does not exist
    #[error(
        "Canonical store {} not found. Run `tikbake extract` first to generate it.",
        path.display()
    )]
    SchemaMissing { path: PathBuf },

    /// The canonical store exists but cannot be parsed or fails the schema check
    #[error("Canonical store {} is invalid: {reason}", path.display())]
    SchemaInvalid { path: PathBuf, reason: String },

    /// Merge ranks could not be read from the source (recoverable)
    #[error("Merge ranks unavailable: {0}")]
    MergeAccessDegraded(String),

    /// I/O error with file context
    #[error("I/O error for {}: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A string field that should hold standard base64 does not decode
    #[error("Invalid base64 value '{value}': {reason}")]
    Base64 { value: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExportError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }

    /// Whether the stage that produced this error must abort.
    ///
    /// Only a degraded merge table is recoverable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MergeAccessDegraded(_))
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
