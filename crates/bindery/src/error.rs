//! Registration and handler errors.

use bindery_core::{ApiError, ShapeError};
use bindery_docs::DocsError;
use bindery_extract::{internal_error_response, message_response, UnknownRule};
use bytes::Bytes;
use http::Response;
use thiserror::Error;

/// A route that cannot be registered.
///
/// Every variant is a startup error; none can occur per request.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The input or output shape cannot be classified.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The operation cannot be added to the document.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// A field uses a rule tag nobody registered.
    #[error(transparent)]
    UnknownRule(#[from] UnknownRule),

    /// The success status is not a valid HTTP status code.
    #[error("invalid success status {status}")]
    InvalidStatus {
        /// The rejected code.
        status: u16,
    },

    /// A path field has no matching `{name}` segment in the route.
    #[error("path field '{field}' of {shape} has no matching segment in '{path}'")]
    MissingPathSegment {
        /// Input shape name.
        shape: String,
        /// Path parameter name.
        field: String,
        /// Route template.
        path: String,
    },
}

/// Error returned by a handler.
///
/// An [`ApiError`] is sent to the client as-is. Anything else becomes a
/// generic 500 and is only logged.
///
/// # Example
///
/// ```
/// use bindery::{ApiError, HandlerError};
/// use http::StatusCode;
///
/// let err: HandlerError = ApiError::not_found("no such user").into();
/// assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
///
/// let err = HandlerError::internal(std::io::Error::other("disk on fire"));
/// assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A business error with an explicit status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Any other failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps an opaque error.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(error))
    }

    /// Returns true for errors the client never sees.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Builds the client response. Internal errors carry no detail.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        match self {
            Self::Api(e) => message_response(e.status(), e.message()),
            Self::Internal(_) => internal_error_response(),
        }
    }
}
