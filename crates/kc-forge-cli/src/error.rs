//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The delegated backend answered with a non-success status.
    #[error("{status} {reason}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The delegated backend reported a failed conversion.
    #[error("{0}")]
    Conversion(String),

    /// Some input files could not be processed.
    #[error("{failed} of {total} file(s) failed")]
    FilesFailed {
        /// Number of failed files.
        failed: usize,
        /// Number of distinct input files.
        total: usize,
    },

    /// A generated path would escape the output directory.
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
