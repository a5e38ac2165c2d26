//! Operation schema synthesis.
//!
//! [`synthesize`] reads the same [`FieldDescriptorSet`] the request binder
//! uses, so the documented parameters, body and constraints always match
//! what the runtime accepts.

use std::sync::OnceLock;

use bindery_core::{
    method_requires_body, parse_scalar, ConstraintKind, ConstraintRule, FieldDescriptor,
    FieldDescriptorSet, Kind, ScalarType, Source,
};
use http::{Method, StatusCode};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::openapi::{MediaType, Operation, Parameter, ParameterIn, RequestBody, Response, Schema};

const JSON_MEDIA_TYPE: &str = "application/json";

/// One synthesized operation plus the component schemas it references.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedOperation {
    /// The operation object.
    pub operation: Operation,
    /// Schemas to store under `components.schemas`, keyed by shape name.
    pub schemas: IndexMap<String, Schema>,
}

/// Builds the operation schema for one method and path.
///
/// Parameters come out in a fixed order: path segments left to right, then
/// query fields, then header fields, each in declaration order. The input's
/// body fields become the request body. The output's body fields become
/// the success response. Both are stored as components and referenced.
///
/// # Example
///
/// ```rust
/// use bindery_core::{Empty, Field, FieldDescriptorSet, ScalarType, Shape, Shaped};
/// use bindery_docs::{synthesize, ParameterIn};
/// use http::{Method, StatusCode};
///
/// let input = Shape::new("GetUser")
///     .field(Field::scalar("id", ScalarType::U64).path("id"))
///     .field(Field::scalar("verbose", ScalarType::Bool).query("verbose"));
/// let input = FieldDescriptorSet::classify(&input).unwrap();
/// let output = FieldDescriptorSet::classify(&Empty::shape()).unwrap();
///
/// let synthesized = synthesize(&Method::GET, "/users/{id}", &input, &output, StatusCode::OK);
/// let operation = &synthesized.operation;
/// assert_eq!(operation.operation_id, "getUsersById");
/// assert!(operation.parameter(ParameterIn::Path, "id").unwrap().required);
/// assert!(!operation.parameter(ParameterIn::Query, "verbose").unwrap().required);
/// assert!(operation.request_body.is_none());
/// ```
#[must_use]
pub fn synthesize(
    method: &Method,
    path: &str,
    input: &FieldDescriptorSet,
    output: &FieldDescriptorSet,
    status: StatusCode,
) -> SynthesizedOperation {
    let mut schemas = IndexMap::new();

    let mut parameters: Vec<Parameter> = path_parameters(path)
        .into_iter()
        .map(|name| Parameter {
            name,
            location: ParameterIn::Path,
            required: true,
            schema: Schema::string(),
        })
        .collect();
    for (source, location) in [
        (Source::Query, ParameterIn::Query),
        (Source::Header, ParameterIn::Header),
    ] {
        parameters.extend(input.fields_from(source).map(|field| Parameter {
            name: field.external_name.clone(),
            location,
            required: field.is_required(),
            schema: field_schema(field),
        }));
    }

    let request_body = if input.has_body_fields() {
        schemas.insert(input.shape_name().to_string(), body_schema(input));
        Some(json_body(Schema::component_ref(input.shape_name())))
    } else if method_requires_body(method) {
        Some(json_body(Schema::object()))
    } else {
        None
    };

    schemas.insert(output.shape_name().to_string(), body_schema(output));
    let mut responses = IndexMap::new();
    responses.insert(
        status.as_u16().to_string(),
        Response {
            description: status.canonical_reason().unwrap_or("Response").to_string(),
            content: json_content(Schema::component_ref(output.shape_name())),
        },
    );
    responses.insert(
        "default".to_string(),
        Response {
            description: "Error".to_string(),
            content: json_content(error_schema()),
        },
    );

    SynthesizedOperation {
        operation: Operation {
            operation_id: operation_id(method, path),
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters,
            request_body,
            responses,
        },
        schemas,
    }
}

/// Derives an operation id from the method and path.
///
/// Literal segments are capitalized and `{param}` segments become
/// `By{Param}`.
///
/// ```rust
/// use bindery_docs::operation_id;
/// use http::Method;
///
/// assert_eq!(operation_id(&Method::GET, "/items"), "getItems");
/// assert_eq!(
///     operation_id(&Method::DELETE, "/orgs/{orgId}/users/{userId}"),
///     "deleteOrgsByOrgIdUsersByUserId"
/// );
/// ```
#[must_use]
pub fn operation_id(method: &Method, path: &str) -> String {
    let mut id = method.as_str().to_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => {
                id.push_str("By");
                id.push_str(&capitalize(param));
            }
            None => id.push_str(&capitalize(segment)),
        }
    }
    id
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn path_param_regex() -> Option<&'static Regex> {
    static PATH_PARAM: OnceLock<Option<Regex>> = OnceLock::new();
    PATH_PARAM.get_or_init(|| Regex::new(r"\{([^}]+)\}").ok()).as_ref()
}

/// Names of the `{name}` segments of a path template, left to right.
#[must_use]
pub fn path_parameters(path: &str) -> Vec<String> {
    path_param_regex()
        .map(|re| {
            re.captures_iter(path)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

fn json_body(schema: Schema) -> RequestBody {
    RequestBody {
        required: true,
        content: json_content(schema),
    }
}

/// Object schema of a set's body fields only.
fn body_schema(set: &FieldDescriptorSet) -> Schema {
    let mut schema = Schema::object();
    for field in set.fields_from(Source::Body) {
        let mut property = field_schema(field);
        property.nullable = field.optional;
        schema.properties.insert(field.external_name.clone(), property);
        if field.is_required() {
            schema.required.push(field.external_name.clone());
        }
    }
    schema
}

/// The fixed `{message, errors: [{field, message}]}` error shape.
fn error_schema() -> Schema {
    let field_error = Schema::object()
        .property("field", Schema::string())
        .property("message", Schema::string())
        .required_property("field")
        .required_property("message");
    Schema::object()
        .property("message", Schema::string())
        .property("errors", Schema::array(field_error))
        .required_property("message")
}

fn scalar_schema(ty: ScalarType) -> Schema {
    match ty {
        ScalarType::String => Schema::string(),
        ScalarType::Bool => Schema::boolean(),
        ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::U8 | ScalarType::U16 => {
            Schema::integer().with_format("int32")
        }
        ScalarType::I64 | ScalarType::U32 | ScalarType::U64 => {
            Schema::integer().with_format("int64")
        }
        ScalarType::F32 => Schema::number().with_format("float"),
        ScalarType::F64 => Schema::number().with_format("double"),
    }
}

fn field_schema(field: &FieldDescriptor) -> Schema {
    let mut schema = match &field.kind {
        Kind::Scalar(ty) | Kind::OptionalScalar(ty) => scalar_schema(*ty),
        Kind::SliceOfScalar(ty) => Schema::array(scalar_schema(*ty)),
        Kind::NestedObject(nested) => body_schema(nested),
    };
    for rule in &field.constraints {
        apply_rule(&mut schema, &field.kind, rule);
    }
    schema
}

enum Measure {
    Length,
    Items,
    Value,
}

fn measure_of(kind: &Kind) -> Option<Measure> {
    match kind {
        Kind::SliceOfScalar(_) => Some(Measure::Items),
        Kind::Scalar(ty) | Kind::OptionalScalar(ty) if ty.is_string() => Some(Measure::Length),
        Kind::Scalar(ty) | Kind::OptionalScalar(ty) if ty.is_numeric() => Some(Measure::Value),
        _ => None,
    }
}

fn set_lower(schema: &mut Schema, measure: &Measure, rule: &ConstraintRule, exclusive: bool) {
    match measure {
        Measure::Value => {
            schema.minimum = rule.numeric_param();
            schema.exclusive_minimum = exclusive;
        }
        Measure::Length | Measure::Items => {
            let Some(count) = rule.count_param() else {
                return;
            };
            let count = if exclusive { count.saturating_add(1) } else { count };
            match measure {
                Measure::Length => schema.min_length = Some(count),
                _ => schema.min_items = Some(count),
            }
        }
    }
}

fn set_upper(schema: &mut Schema, measure: &Measure, rule: &ConstraintRule, exclusive: bool) {
    match measure {
        Measure::Value => {
            schema.maximum = rule.numeric_param();
            schema.exclusive_maximum = exclusive;
        }
        Measure::Length | Measure::Items => {
            let Some(count) = rule.count_param() else {
                return;
            };
            let count = if exclusive { count.saturating_sub(1) } else { count };
            match measure {
                Measure::Length => schema.max_length = Some(count),
                _ => schema.max_items = Some(count),
            }
        }
    }
}

fn apply_rule(schema: &mut Schema, kind: &Kind, rule: &ConstraintRule) {
    match &rule.kind {
        ConstraintKind::Email => schema.format = Some("email".to_string()),
        ConstraintKind::Url => schema.format = Some("uri".to_string()),
        ConstraintKind::Uuid => schema.format = Some("uuid".to_string()),
        ConstraintKind::Datetime => schema.format = Some("date-time".to_string()),
        ConstraintKind::OneOf => {
            let ty = kind.scalar_type().unwrap_or(ScalarType::String);
            schema.enum_values = rule
                .choices()
                .into_iter()
                .map(|choice| {
                    parse_scalar(choice, ty).unwrap_or_else(|_| Value::String(choice.to_string()))
                })
                .collect();
        }
        ConstraintKind::Min | ConstraintKind::Gte => {
            if let Some(measure) = measure_of(kind) {
                set_lower(schema, &measure, rule, false);
            }
        }
        ConstraintKind::Max | ConstraintKind::Lte => {
            if let Some(measure) = measure_of(kind) {
                set_upper(schema, &measure, rule, false);
            }
        }
        ConstraintKind::Gt => {
            if let Some(measure) = measure_of(kind) {
                set_lower(schema, &measure, rule, true);
            }
        }
        ConstraintKind::Lt => {
            if let Some(measure) = measure_of(kind) {
                set_upper(schema, &measure, rule, true);
            }
        }
        ConstraintKind::Len => match measure_of(kind) {
            Some(measure @ (Measure::Length | Measure::Items)) => {
                set_lower(schema, &measure, rule, false);
                set_upper(schema, &measure, rule, false);
            }
            _ => {}
        },
        ConstraintKind::Required | ConstraintKind::OmitEmpty | ConstraintKind::Custom(_) => {}
    }
}
