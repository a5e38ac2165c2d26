//! Rejections: why a request never reached its handler.

use crate::response::{json_response, JsonResponse};
use crate::{BindError, ValidationError};
use bytes::Bytes;
use http::{Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// A request rejected before the handler ran.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The request could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The bound input broke a declared rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl Rejection {
    /// HTTP status: 400 or 413 for binding, 422 for validation.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind(e) => e.status_code(),
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Error code used in logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Bind(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_FAILED",
        }
    }

    /// Builds the JSON error response.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bindery_extract::{BindError, Rejection};
    /// use http::StatusCode;
    ///
    /// let response = Rejection::from(BindError::empty_body()).into_response();
    /// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    /// assert_eq!(response.body().as_ref(), br#"{"message":"invalid request body"}"#);
    /// ```
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let status = self.status_code();
        match self {
            Self::Bind(e) => JsonResponse::new(MessageBody { message: e.message() })
                .with_status(status)
                .into_response(),
            Self::Validation(e) => JsonResponse::new(e).with_status(status).into_response(),
        }
    }
}

impl From<Rejection> for Response<Bytes> {
    fn from(rejection: Rejection) -> Self {
        rejection.into_response()
    }
}

/// Builds a `{"message": ...}` response.
#[must_use]
pub fn message_response(status: StatusCode, message: &str) -> Response<Bytes> {
    match serde_json::to_vec(&MessageBody { message }) {
        Ok(body) => json_response(status, Bytes::from(body)),
        Err(_) => json_response(status, Bytes::new()),
    }
}
