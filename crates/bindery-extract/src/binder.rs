//! The request binder.
//!
//! A [`RequestBinder`] is built once per route from the route's
//! [`FieldDescriptorSet`] and then binds every request for that route:
//!
//! 1. Decode the JSON body into an object when the route reads one.
//! 2. Drop every key the body supplied for a non-body field.
//! 3. Overwrite with query, header and path values.
//! 4. Fill every field the request left out with its zero value.
//! 5. Hand the object to serde to build the typed input.
//!
//! Later sources win, so a query parameter always beats a body key with
//! the same name.

use crate::body::{decode_object, DEFAULT_MAX_BODY_SIZE};
use crate::header::bind_header_fields;
use crate::query::{bind_query_fields, QueryValues};
use crate::{BindError, ExtractionContext, Rejection, Validator};
use bindery_core::{method_requires_body, parse_scalar, FieldDescriptorSet, Kind, Source};
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Binds requests for one route into its input type.
///
/// # Example
///
/// ```rust
/// use bindery_core::{Field, FieldDescriptorSet, ScalarType, Shape};
/// use bindery_extract::{ExtractionContextBuilder, RequestBinder};
/// use http::{Method, Uri};
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Deserialize)]
/// struct GetUser {
///     id: u64,
///     verbose: bool,
/// }
///
/// let shape = Shape::new("GetUser")
///     .field(Field::scalar("id", ScalarType::U64).path("id"))
///     .field(Field::scalar("verbose", ScalarType::Bool).query("verbose"));
/// let set = Arc::new(FieldDescriptorSet::classify(&shape).unwrap());
/// let binder = RequestBinder::new(set, &Method::GET);
///
/// let ctx = ExtractionContextBuilder::new()
///     .uri(Uri::from_static("/users/7?verbose=true"))
///     .path_param("id", "7")
///     .build();
/// let input: GetUser = binder.bind(&ctx).unwrap();
/// assert_eq!(input.id, 7);
/// assert!(input.verbose);
/// ```
#[derive(Debug, Clone)]
pub struct RequestBinder {
    descriptors: Arc<FieldDescriptorSet>,
    reads_body: bool,
    max_body_size: usize,
}

impl RequestBinder {
    /// Creates a binder for a route with the given method.
    ///
    /// The body is read when the shape declares body fields or the method
    /// is POST, PUT or PATCH.
    #[must_use]
    pub fn new(descriptors: Arc<FieldDescriptorSet>, method: &Method) -> Self {
        let reads_body = descriptors.has_body_fields() || method_requires_body(method);
        Self {
            descriptors,
            reads_body,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the body size limit.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// The descriptors this binder reads.
    #[must_use]
    pub fn descriptors(&self) -> &Arc<FieldDescriptorSet> {
        &self.descriptors
    }

    /// Returns true if requests must carry a JSON body.
    #[must_use]
    pub fn reads_body(&self) -> bool {
        self.reads_body
    }

    /// Body size limit in bytes.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Binds a request into an object with one key per field.
    ///
    /// Every field is present in the result: bound from the request or
    /// holding its zero value. Optional fields the request left out are
    /// `null`.
    pub fn bind_value(&self, ctx: &ExtractionContext) -> Result<Map<String, Value>, BindError> {
        let set = self.descriptors.as_ref();

        let mut object = if self.reads_body {
            decode_object(ctx.body(), self.max_body_size)?
        } else {
            Map::new()
        };

        // The body may only fill body fields.
        for field in set.fields() {
            if field.source != Source::Body {
                object.remove(field.binding_key());
            }
        }
        for name in set.skipped() {
            object.remove(name);
        }

        let query = QueryValues::parse(ctx.query_string())?;
        bind_query_fields(set, &query, &mut object)?;
        bind_header_fields(set, ctx.headers(), &mut object)?;
        bind_path_fields(set, ctx, &mut object)?;

        fill_zero_values(set, &mut object);
        Ok(object)
    }

    /// Converts a bound object into the typed input.
    pub fn decode<T: DeserializeOwned>(&self, object: Map<String, Value>) -> Result<T, BindError> {
        serde_json::from_value(Value::Object(object))
            .map_err(|e| BindError::type_mismatch(e.to_string()))
    }

    /// Binds a request straight into `T`.
    pub fn bind<T: DeserializeOwned>(&self, ctx: &ExtractionContext) -> Result<T, BindError> {
        let object = self.bind_value(ctx)?;
        self.decode(object)
    }

    /// Binds a request into `T` and checks its declared rules.
    ///
    /// Binding and decoding failures win over rule failures, so a request
    /// is only validated once it is known to be well formed.
    pub fn extract<T: DeserializeOwned>(
        &self,
        ctx: &ExtractionContext,
        validator: &Validator,
    ) -> Result<T, Rejection> {
        let value = Value::Object(self.bind_value(ctx)?);
        let input = T::deserialize(&value).map_err(|e| BindError::type_mismatch(e.to_string()))?;
        if let Value::Object(object) = &value {
            validator.validate(&self.descriptors, object)?;
        }
        Ok(input)
    }
}

fn bind_path_fields(
    set: &FieldDescriptorSet,
    ctx: &ExtractionContext,
    object: &mut Map<String, Value>,
) -> Result<(), BindError> {
    for field in set.fields_from(Source::Path) {
        let Kind::Scalar(ty) = field.kind else {
            continue;
        };
        let name = field.external_name.as_str();
        if let Some(raw) = ctx.path_param(name).filter(|raw| !raw.is_empty()) {
            let value = parse_scalar(raw, ty)
                .map_err(|e| BindError::invalid_parameter(Source::Path, name, e))?;
            object.insert(field.binding_key().to_string(), value);
        }
    }
    Ok(())
}

fn fill_zero_values(set: &FieldDescriptorSet, object: &mut Map<String, Value>) {
    for field in set.fields() {
        let key = field.binding_key();
        let missing = match object.get_mut(key) {
            Some(Value::Object(inner)) => {
                if let Kind::NestedObject(nested) = &field.kind {
                    fill_zero_values(nested, inner);
                }
                false
            }
            Some(value) => value.is_null(),
            None => true,
        };
        if missing {
            object.insert(key.to_string(), field.kind.zero_value());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;
    use bindery_core::{Field, ScalarType, Shape};
    use http::{StatusCode, Uri};
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    fn binder(shape: &Shape, method: &Method) -> RequestBinder {
        RequestBinder::new(Arc::new(FieldDescriptorSet::classify(shape).unwrap()), method)
    }

    fn create_input() -> Shape {
        Shape::new("CreateInput")
            .field(Field::scalar("org_id", ScalarType::String).path("orgId"))
            .field(Field::scalar("dry_run", ScalarType::Bool).query("dry_run"))
            .field(Field::optional("token", ScalarType::String).header("X-Token"))
            .field(Field::scalar("name", ScalarType::String).validate("required"))
            .field(Field::scalar("internal", ScalarType::String).skip())
    }

    #[derive(Debug, Deserialize)]
    struct CreateInput {
        org_id: String,
        dry_run: bool,
        token: Option<String>,
        name: String,
        #[serde(default)]
        internal: String,
    }

    #[test]
    fn test_binds_every_source() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .uri(Uri::from_static("/orgs/acme/items?dry_run=true"))
            .header("X-Token", "t0k")
            .path_param("orgId", "acme")
            .body(r#"{"name":"widget"}"#)
            .build();

        let input: CreateInput = binder(&create_input(), &Method::POST).bind(&ctx).unwrap();
        assert_eq!(input.org_id, "acme");
        assert!(input.dry_run);
        assert_eq!(input.token.as_deref(), Some("t0k"));
        assert_eq!(input.name, "widget");
        assert_eq!(input.internal, "");
    }

    #[test]
    fn test_body_cannot_fill_non_body_fields() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .body(r#"{"name":"w","dry_run":true,"org_id":"evil","token":"x","internal":"y"}"#)
            .build();

        let object = binder(&create_input(), &Method::POST).bind_value(&ctx).unwrap();
        assert_eq!(object["dry_run"], json!(false));
        assert_eq!(object["org_id"], json!(""));
        assert_eq!(object["token"], json!(null));
        assert!(!object.contains_key("internal"));
    }

    #[test]
    fn test_absent_fields_get_zero_values() {
        let address = Shape::new("Address")
            .field(Field::scalar("street", ScalarType::String))
            .field(Field::scalar("zip", ScalarType::U32));
        let shape = Shape::new("Person")
            .field(Field::scalar("name", ScalarType::String))
            .field(Field::optional("nickname", ScalarType::String))
            .field(Field::list("tags", ScalarType::String))
            .field(Field::object("address", address));

        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .body(r#"{"name":null,"address":{"street":"Main"}}"#)
            .build();
        let object = binder(&shape, &Method::POST).bind_value(&ctx).unwrap();
        assert_eq!(
            Value::Object(object),
            json!({
                "name": "",
                "nickname": null,
                "tags": [],
                "address": {"street": "Main", "zip": 0}
            })
        );
    }

    #[test]
    fn test_get_ignores_body() {
        let shape = Shape::new("Search").field(Field::scalar("q", ScalarType::String).query("q"));
        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/search?q=rust"))
            .body("not json")
            .build();
        let b = binder(&shape, &Method::GET);
        assert!(!b.reads_body());
        assert_eq!(b.bind_value(&ctx).unwrap()["q"], json!("rust"));
    }

    #[test]
    fn test_post_requires_body_even_without_body_fields() {
        let shape = Shape::new("Trigger").field(Field::scalar("id", ScalarType::U64).path("id"));
        let b = binder(&shape, &Method::POST);
        assert!(b.reads_body());

        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .path_param("id", "3")
            .build();
        assert_eq!(b.bind_value(&ctx).unwrap_err().error_code(), "EMPTY_BODY");

        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .path_param("id", "3")
            .body("{}")
            .build();
        assert_eq!(b.bind_value(&ctx).unwrap()["id"], json!(3));
    }

    #[test]
    fn test_bad_path_value() {
        let shape = Shape::new("GetUser").field(Field::scalar("id", ScalarType::U64).path("id"));
        let ctx = ExtractionContextBuilder::new().path_param("id", "abc").build();
        let err = binder(&shape, &Method::GET).bind_value(&ctx).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.extraction_source(), Source::Path);
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_type_mismatch_is_generic() {
        let shape = Shape::new("Item").field(Field::scalar("count", ScalarType::I32));
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .body(r#"{"count":"three"}"#)
            .build();

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Item {
            count: i32,
        }

        let err = binder(&shape, &Method::POST).bind::<Item>(&ctx).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
        assert_eq!(err.to_string(), crate::INVALID_BODY_MESSAGE);
    }

    #[test]
    fn test_extract_reports_bind_errors_before_rules() {
        #[derive(Debug, Deserialize)]
        struct Search {
            q: String,
            page: i64,
        }

        let shape = Shape::new("Search")
            .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
            .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"));
        let b = binder(&shape, &Method::GET);
        let validator = Validator::new();

        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/search?page=x"))
            .build();
        let err = b.extract::<Search>(&ctx, &validator).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/search?page=0"))
            .build();
        match b.extract::<Search>(&ctx, &validator).unwrap_err() {
            Rejection::Validation(e) => {
                assert!(e.for_field("q").is_some());
                assert!(e.for_field("page").is_some());
            }
            other => panic!("expected validation rejection, got {other:?}"),
        }

        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/search?q=rust&page=2"))
            .build();
        let input = b.extract::<Search>(&ctx, &validator).unwrap();
        assert_eq!((input.q.as_str(), input.page), ("rust", 2));
    }

    #[test]
    fn test_body_size_limit() {
        let shape = Shape::new("Item").field(Field::scalar("name", ScalarType::String));
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .body(r#"{"name":"0123456789"}"#)
            .build();
        let err = binder(&shape, &Method::POST)
            .with_max_body_size(4)
            .bind_value(&ctx)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    proptest! {
        #[test]
        fn prop_query_beats_body(from_body in "[a-z]{1,8}", from_query in "[a-z]{1,8}") {
            let shape = Shape::new("S")
                .field(Field::scalar("q", ScalarType::String).query("q"))
                .field(Field::scalar("note", ScalarType::String));
            let uri: Uri = format!("/s?q={from_query}").parse().unwrap();
            let ctx = ExtractionContextBuilder::new()
                .method(Method::POST)
                .uri(uri)
                .body(format!(r#"{{"q":"{from_body}","note":"n"}}"#))
                .build();

            let object = binder(&shape, &Method::POST).bind_value(&ctx).unwrap();
            prop_assert_eq!(&object["q"], &json!(from_query));
            prop_assert_eq!(&object["note"], &json!("n"));
        }
    }
}
