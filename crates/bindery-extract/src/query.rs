//! Query string reading.
//!
//! [`QueryValues`] keeps every `name=value` pair in appearance order so
//! repeated parameters bind to list fields without losing order.

use crate::BindError;
use bindery_core::{parse_scalar, FieldDescriptorSet, Kind, Source};
use serde_json::{Map, Value};

/// Decoded query string pairs in appearance order.
///
/// # Example
///
/// ```rust
/// use bindery_extract::QueryValues;
///
/// let values = QueryValues::parse(Some("tag=a&tag=b&q=rust%20lang")).unwrap();
/// assert_eq!(values.all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(values.first("q"), Some("rust lang"));
/// assert!(!values.contains("page"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    pairs: Vec<(String, String)>,
}

impl QueryValues {
    /// Decodes a raw query string. `None` yields no values.
    pub fn parse(query: Option<&str>) -> Result<Self, BindError> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(Self::default());
        };
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| BindError::malformed_query(e.to_string()))?;
        Ok(Self { pairs })
    }

    /// The first value for `name`, if present. May be empty.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.all(name).next()
    }

    /// Every value for `name`, in appearance order.
    pub fn all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `name` appears at least once.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }
}

/// Writes every query field of `set` into `object`.
///
/// Optional fields are set when the parameter is present, even if empty.
/// List fields collect every value in order. Plain scalars skip absent and
/// empty values so they keep their zero value.
pub(crate) fn bind_query_fields(
    set: &FieldDescriptorSet,
    values: &QueryValues,
    object: &mut Map<String, Value>,
) -> Result<(), BindError> {
    for field in set.fields_from(Source::Query) {
        let name = field.external_name.as_str();
        let parse = |raw: &str, ty| {
            parse_scalar(raw, ty).map_err(|e| BindError::invalid_parameter(Source::Query, name, e))
        };

        match &field.kind {
            Kind::OptionalScalar(ty) => {
                if let Some(raw) = values.first(name) {
                    object.insert(field.binding_key().to_string(), parse(raw, *ty)?);
                }
            }
            Kind::SliceOfScalar(ty) => {
                let items = values
                    .all(name)
                    .map(|raw| parse(raw, *ty))
                    .collect::<Result<Vec<_>, _>>()?;
                if !items.is_empty() {
                    object.insert(field.binding_key().to_string(), Value::Array(items));
                }
            }
            Kind::Scalar(ty) => {
                if let Some(raw) = values.first(name).filter(|raw| !raw.is_empty()) {
                    object.insert(field.binding_key().to_string(), parse(raw, *ty)?);
                }
            }
            Kind::NestedObject(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{Field, ScalarType, Shape};
    use serde_json::json;

    fn bind(shape: Shape, query: &str) -> Result<Map<String, Value>, BindError> {
        let set = FieldDescriptorSet::classify(&shape).unwrap();
        let values = QueryValues::parse(Some(query))?;
        let mut object = Map::new();
        bind_query_fields(&set, &values, &mut object)?;
        Ok(object)
    }

    #[test]
    fn test_parse_empty_and_missing() {
        assert_eq!(QueryValues::parse(None).unwrap(), QueryValues::default());
        assert_eq!(QueryValues::parse(Some("")).unwrap(), QueryValues::default());
    }

    #[test]
    fn test_plus_and_percent_decoding() {
        let values = QueryValues::parse(Some("q=hello+world&e=a%26b")).unwrap();
        assert_eq!(values.first("q"), Some("hello world"));
        assert_eq!(values.first("e"), Some("a&b"));
    }

    #[test]
    fn test_repeated_values_keep_order() {
        let shape = Shape::new("S").field(Field::list("tags", ScalarType::String).query("tag"));
        let object = bind(shape, "tag=c&other=x&tag=a&tag=b").unwrap();
        assert_eq!(object["tags"], json!(["c", "a", "b"]));
    }

    #[test]
    fn test_optional_present_and_absent() {
        let shape = Shape::new("S")
            .field(Field::optional("debug", ScalarType::Bool).query("debug"))
            .field(Field::optional("limit", ScalarType::I32).query("limit"));
        let object = bind(shape.clone(), "debug=true").unwrap();
        assert_eq!(object["debug"], json!(true));
        assert!(!object.contains_key("limit"));

        let err = bind(shape, "limit=").unwrap_err();
        assert_eq!(err.field(), Some("limit"));
    }

    #[test]
    fn test_scalar_empty_value_is_skipped() {
        let shape = Shape::new("S").field(Field::scalar("page", ScalarType::I64).query("page"));
        assert!(bind(shape.clone(), "page=").unwrap().is_empty());
        assert_eq!(bind(shape, "page=3&page=9").unwrap()["page"], json!(3));
    }

    #[test]
    fn test_conversion_failure_names_parameter() {
        let shape = Shape::new("S").field(Field::list("ids", ScalarType::U32).query("id"));
        let err = bind(shape, "id=1&id=two").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid query parameter \"id\": invalid unsigned integer value \"two\""
        );
    }

    #[test]
    fn test_declared_name_is_binding_key() {
        let shape = Shape::new("S").field(Field::scalar("search", ScalarType::String).query("q"));
        let object = bind(shape, "q=rust").unwrap();
        assert_eq!(object["search"], json!("rust"));
        assert!(!object.contains_key("q"));
    }
}
