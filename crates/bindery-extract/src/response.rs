//! JSON response building.
//!
//! Every response the engine writes is JSON with
//! `Content-Type: application/json; charset=utf-8`.

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

/// Content type of every response body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body sent when a response cannot be serialized or a handler fails.
pub const INTERNAL_ERROR_BODY: &[u8] = br#"{"message":"internal server error"}"#;

/// JSON response builder.
///
/// # Example
///
/// ```rust
/// use bindery_extract::JsonResponse;
/// use http::StatusCode;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
/// }
///
/// let response = JsonResponse::new(User { id: 1 })
///     .with_status(StatusCode::CREATED)
///     .into_response();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body().as_ref(), br#"{"id":1}"#);
/// ```
#[derive(Debug)]
pub struct JsonResponse<T> {
    data: T,
    status: StatusCode,
}

impl<T: Serialize> JsonResponse<T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the data.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Builds the HTTP response.
    ///
    /// A value that fails to serialize yields a 500 with a generic body.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        match serde_json::to_vec(&self.data) {
            Ok(body) => json_response(self.status, Bytes::from(body)),
            Err(e) => {
                tracing::error!(error = %e, "response serialization failed");
                internal_error_response()
            }
        }
    }
}

/// Builds a JSON response from an already encoded body.
#[must_use]
pub fn json_response(status: StatusCode, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}

/// The generic 500 response.
#[must_use]
pub fn internal_error_response() -> Response<Bytes> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        Bytes::from_static(INTERNAL_ERROR_BODY),
    )
}
