//! JSON body decoding.

use crate::BindError;
use serde_json::{Map, Value};

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Decodes a request body as a JSON object.
///
/// The size limit is checked before parsing. An empty body, malformed JSON
/// and any top-level value other than an object are rejected. A literal
/// `null` decodes to an empty object.
///
/// # Example
///
/// ```rust
/// use bindery_extract::{decode_object, DEFAULT_MAX_BODY_SIZE};
///
/// let object = decode_object(br#"{"name":"Alice"}"#, DEFAULT_MAX_BODY_SIZE).unwrap();
/// assert_eq!(object["name"], "Alice");
///
/// assert!(decode_object(b"", DEFAULT_MAX_BODY_SIZE).is_err());
/// assert!(decode_object(b"[1,2]", DEFAULT_MAX_BODY_SIZE).is_err());
/// ```
pub fn decode_object(body: &[u8], max_size: usize) -> Result<Map<String, Value>, BindError> {
    if body.len() > max_size {
        return Err(BindError::payload_too_large(max_size, body.len()));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BindError::empty_body());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(BindError::malformed_body(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(BindError::malformed_body(e.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
