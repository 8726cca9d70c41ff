//! Error types for cv-output.

use thiserror::Error;

use cv_core::PopError;

/// Errors that can occur when exporting, snapshotting or loading.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("snapshot version {found} is newer than supported version {supported}")]
    Version { found: u32, supported: u32 },

    #[error(transparent)]
    Pop(#[from] PopError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
