//! Error types shared across Bindery.
//!
//! [`ApiError`] is the error a handler returns to control the response
//! status. [`ShapeError`] reports a declaration that cannot be bound; it
//! surfaces at registration, never per request.

use crate::descriptor::Source;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// A business error with an explicit HTTP status.
///
/// Returned verbatim to the client as `{"message": ...}` with `status`.
///
/// # Example
///
/// ```
/// use bindery_core::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::not_found("user not found");
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "404: user not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}: {message}", .status.as_u16())]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates an error with the given status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A shape declaration that cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Two fields share a declared name.
    #[error("shape {shape}: duplicate field '{field}'")]
    DuplicateField {
        /// Shape name.
        shape: String,
        /// Declared field name.
        field: String,
    },

    /// Two fields read the same wire name from the same source.
    #[error("shape {shape}: {binding} name '{name}' is bound by more than one field")]
    DuplicateWireName {
        /// Shape name.
        shape: String,
        /// Source the name is read from.
        binding: Source,
        /// Wire name.
        name: String,
    },

    /// The field's type cannot be read from its source.
    #[error("shape {shape}: field '{field}' of type {kind} cannot be bound from {binding}")]
    UnsupportedKind {
        /// Shape name.
        shape: String,
        /// Declared field name.
        field: String,
        /// Declared source.
        binding: Source,
        /// Description of the field type.
        kind: String,
    },

    /// A nested object field declares a non-body binding.
    #[error("shape {shape}: nested field '{field}' cannot be bound from {binding}")]
    NestedBinding {
        /// Nested shape name.
        shape: String,
        /// Declared field name.
        field: String,
        /// Declared source.
        binding: Source,
    },

    /// A rule has an unusable param or does not apply to the field type.
    #[error("shape {shape}: rule '{rule}' on field '{field}' {reason}")]
    InvalidRule {
        /// Shape name.
        shape: String,
        /// Declared field name.
        field: String,
        /// The rule as declared.
        rule: String,
        /// What is wrong with it.
        reason: String,
    },
}
