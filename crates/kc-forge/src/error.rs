//! Error types for realm conversion.
//!
//! Conversion is deliberately tolerant: malformed entities inside a valid
//! document are reported as [`Diagnostic`](crate::Diagnostic)s rather than
//! errors. Only a document that is not a realm export at all fails.

use thiserror::Error;

/// Result type alias using the forge error type.
pub type ForgeResult<T> = std::result::Result<T, ForgeError>;

/// Errors raised by the generator.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The document is not an object with a truthy `realm` field.
    #[error("not a Keycloak realm export: {file_name}")]
    InvalidDocument {
        /// Name of the originating file.
        file_name: String,
    },

    /// The input could not be parsed as JSON.
    #[error("invalid JSON in {file_name}: {source}")]
    Json {
        /// Name of the originating file.
        file_name: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A generated structure could not be formatted as HCL.
    #[error("failed to render HCL: {0}")]
    Render(#[from] hcl::Error),
}

impl ForgeError {
    /// Returns the file name the error refers to, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::InvalidDocument { file_name } | Self::Json { file_name, .. } => Some(file_name),
            Self::Render(_) => None,
        }
    }
}
