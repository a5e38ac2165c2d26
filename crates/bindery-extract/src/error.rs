//! Binding error types.
//!
//! A [`BindError`] stops the pipeline before validation runs. It records
//! the request part it came from and maps to an HTTP status.

use bindery_core::{ScalarParseError, Source};
use http::StatusCode;
use std::fmt;

/// Client-facing message for every body decoding failure.
pub const INVALID_BODY_MESSAGE: &str = "invalid request body";

/// Error that occurs while binding a request.
///
/// # Example
///
/// ```rust
/// use bindery_core::{parse_scalar, ScalarType, Source};
/// use bindery_extract::BindError;
/// use http::StatusCode;
///
/// let cause = parse_scalar("abc", ScalarType::I64).unwrap_err();
/// let err = BindError::invalid_parameter(Source::Query, "page", cause);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(
///     err.to_string(),
///     "invalid query parameter \"page\": invalid integer value \"abc\""
/// );
/// ```
#[derive(Debug)]
pub struct BindError {
    extraction_source: Source,
    kind: BindErrorKind,
    field: Option<String>,
    message: String,
    detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindErrorKind {
    /// Query, header or path value failed scalar conversion
    InvalidParameter,
    /// Header value is not valid UTF-8
    InvalidEncoding,
    /// Query string could not be decoded
    MalformedQuery,
    /// Body missing where one is required
    EmptyBody,
    /// Body is not a JSON object
    MalformedBody,
    /// Bound object does not fit the target type
    TypeMismatch,
    /// Body is too large
    PayloadTooLarge,
}

impl BindError {
    /// Creates an error for a value that failed scalar conversion.
    #[must_use]
    pub fn invalid_parameter(
        source: Source,
        field: impl Into<String>,
        cause: ScalarParseError,
    ) -> Self {
        let field = field.into();
        let label = match source {
            Source::Header => "header".to_string(),
            other => format!("{other} parameter"),
        };
        Self {
            extraction_source: source,
            kind: BindErrorKind::InvalidParameter,
            message: format!("invalid {label} {field:?}: {cause}"),
            field: Some(field),
            detail: None,
        }
    }

    /// Creates an error for a header whose bytes are not UTF-8.
    #[must_use]
    pub fn invalid_encoding(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            extraction_source: Source::Header,
            kind: BindErrorKind::InvalidEncoding,
            message: format!("invalid header {field:?}: value is not valid UTF-8"),
            field: Some(field),
            detail: None,
        }
    }

    /// Creates an error for a query string that cannot be decoded.
    #[must_use]
    pub fn malformed_query(detail: impl Into<String>) -> Self {
        Self {
            extraction_source: Source::Query,
            kind: BindErrorKind::MalformedQuery,
            message: "invalid query string".to_string(),
            field: None,
            detail: Some(detail.into()),
        }
    }

    /// Creates an error for a missing body on a method that requires one.
    #[must_use]
    pub fn empty_body() -> Self {
        Self::body(BindErrorKind::EmptyBody, "empty request body")
    }

    /// Creates an error for a body that is not a JSON object.
    #[must_use]
    pub fn malformed_body(detail: impl Into<String>) -> Self {
        Self::body(BindErrorKind::MalformedBody, detail)
    }

    /// Creates an error for a bound object serde could not convert.
    #[must_use]
    pub fn type_mismatch(detail: impl Into<String>) -> Self {
        Self::body(BindErrorKind::TypeMismatch, detail)
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: Source::Body,
            kind: BindErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
            detail: None,
        }
    }

    fn body(kind: BindErrorKind, detail: impl Into<String>) -> Self {
        Self {
            extraction_source: Source::Body,
            kind,
            message: INVALID_BODY_MESSAGE.to_string(),
            field: None,
            detail: Some(detail.into()),
        }
    }

    /// Returns the request part the error came from.
    #[must_use]
    pub fn extraction_source(&self) -> Source {
        self.extraction_source
    }

    /// Returns the wire name of the offending parameter, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Internal cause, for logs only.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            BindErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            BindErrorKind::InvalidParameter
            | BindErrorKind::InvalidEncoding
            | BindErrorKind::MalformedQuery
            | BindErrorKind::EmptyBody
            | BindErrorKind::MalformedBody
            | BindErrorKind::TypeMismatch => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the error code used in logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindErrorKind::InvalidParameter => "INVALID_PARAMETER",
            BindErrorKind::InvalidEncoding => "INVALID_ENCODING",
            BindErrorKind::MalformedQuery => "MALFORMED_QUERY",
            BindErrorKind::EmptyBody => "EMPTY_BODY",
            BindErrorKind::MalformedBody => "MALFORMED_BODY",
            BindErrorKind::TypeMismatch => "TYPE_MISMATCH",
            BindErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BindError {}
