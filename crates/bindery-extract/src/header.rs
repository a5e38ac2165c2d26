//! Header reading.

use crate::BindError;
use bindery_core::{parse_scalar, FieldDescriptorSet, Kind, Source};
use http::HeaderMap;
use serde_json::{Map, Value};

/// Returns the first value of header `name` as text.
///
/// Lookup is case-insensitive. An empty value reads as absent.
///
/// # Example
///
/// ```rust
/// use bindery_extract::header_value;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-request-id", "abc-123".parse().unwrap());
///
/// assert_eq!(header_value(&headers, "X-Request-Id").unwrap(), Some("abc-123"));
/// assert_eq!(header_value(&headers, "x-missing").unwrap(), None);
/// ```
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, BindError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let text =
        std::str::from_utf8(value.as_bytes()).map_err(|_| BindError::invalid_encoding(name))?;
    Ok(Some(text).filter(|text| !text.is_empty()))
}

/// Writes every header field of `set` into `object`.
///
/// Absent and empty headers leave the field untouched for both plain and
/// optional scalars.
pub(crate) fn bind_header_fields(
    set: &FieldDescriptorSet,
    headers: &HeaderMap,
    object: &mut Map<String, Value>,
) -> Result<(), BindError> {
    for field in set.fields_from(Source::Header) {
        let name = field.external_name.as_str();
        let ty = match &field.kind {
            Kind::Scalar(ty) | Kind::OptionalScalar(ty) => *ty,
            Kind::SliceOfScalar(_) | Kind::NestedObject(_) => continue,
        };
        if let Some(raw) = header_value(headers, name)? {
            let value = parse_scalar(raw, ty)
                .map_err(|e| BindError::invalid_parameter(Source::Header, name, e))?;
            object.insert(field.binding_key().to_string(), value);
        }
    }
    Ok(())
}
