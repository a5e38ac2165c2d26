//! Error types for document generation.

use thiserror::Error;

/// Errors that can occur while building the API document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The method has no slot in an OpenAPI path item.
    #[error("method '{method}' not supported")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
    },

    /// Another operation already documents this method and path.
    #[error("operation {method} {path} is already documented")]
    DuplicateOperation {
        /// HTTP method.
        method: String,
        /// Path template.
        path: String,
    },

    /// Two different shapes claim the same component name.
    #[error("schema '{name}' is already registered with a different shape")]
    SchemaConflict {
        /// Component name.
        name: String,
    },
}

/// Result type for document operations.
pub type DocsResult<T> = Result<T, DocsError>;
