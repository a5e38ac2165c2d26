//! Validation of bound values against declared rules.
//!
//! The [`Validator`] reads the same [`FieldDescriptorSet`] the binder used
//! and checks every field's rules against the bound object. All failing
//! fields are collected; each field reports its first failing rule.
//!
//! Semantics per rule:
//!
//! | Rule | Passes when |
//! |------|-------------|
//! | `required` | optional: set; list: non-empty; other: not the zero value |
//! | `min` / `max` / `len` | string char count, number value or list length within bound |
//! | `gte` / `lte` / `gt` / `lt` | same measure compared with the bound |
//! | `oneof` | textual value is one of the listed words |
//! | `email` / `url` / `uuid` / `datetime` | string has that format |
//!
//! An unset optional field only runs `required`. `omitempty` skips a zero
//! field's other rules.

use bindery_core::{ConstraintKind, ConstraintRule, FieldDescriptor, FieldDescriptorSet, Kind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Message carried by every [`ValidationError`].
pub const VALIDATION_FAILED_MESSAGE: &str = "validation failed";

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Declared field name.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Every failing field of a bound value.
///
/// Serializes as `{"message": "validation failed", "errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Always `"validation failed"`.
    pub message: String,
    /// Failing fields in declaration order, nested fields after their parent.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    fn new(errors: Vec<FieldError>) -> Self {
        Self {
            message: VALIDATION_FAILED_MESSAGE.to_string(),
            errors,
        }
    }

    /// Returns the error for `field`, if it failed.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// A rule tag with no registered check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' uses unknown rule '{rule}'")]
pub struct UnknownRule {
    /// Declared field name.
    pub field: String,
    /// The unknown tag.
    pub rule: String,
}

/// An application-defined check: receives the field value and the rule param.
pub type RuleFn = Arc<dyn Fn(&Value, &str) -> bool + Send + Sync>;

/// Runs declared rules against bound values.
#[derive(Clone, Default)]
pub struct Validator {
    custom: HashMap<String, RuleFn>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.custom.keys().collect();
        tags.sort();
        f.debug_struct("Validator").field("custom", &tags).finish()
    }
}

impl Validator {
    /// Creates a validator with only the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check for a custom tag. A failure reports
    /// `"failed {tag} validation"`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bindery_extract::Validator;
    ///
    /// let mut validator = Validator::new();
    /// validator.register("lowercase", |value, _param| {
    ///     value.as_str().is_some_and(|s| s.chars().all(|c| !c.is_uppercase()))
    /// });
    /// assert!(validator.has_rule("lowercase"));
    /// ```
    pub fn register<F>(&mut self, tag: impl Into<String>, check: F)
    where
        F: Fn(&Value, &str) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(tag.into(), Arc::new(check));
    }

    /// Returns true if a custom check is registered for `tag`.
    #[must_use]
    pub fn has_rule(&self, tag: &str) -> bool {
        self.custom.contains_key(tag)
    }

    /// Confirms every custom tag used by `set` has a registered check.
    pub fn check_known(&self, set: &FieldDescriptorSet) -> Result<(), UnknownRule> {
        for field in set.fields() {
            for rule in &field.constraints {
                if let ConstraintKind::Custom(tag) = &rule.kind {
                    if !self.has_rule(tag) {
                        return Err(UnknownRule {
                            field: field.name.clone(),
                            rule: tag.clone(),
                        });
                    }
                }
            }
            if let Kind::NestedObject(nested) = &field.kind {
                self.check_known(nested)?;
            }
        }
        Ok(())
    }

    /// Validates a bound object against `set`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bindery_core::{Field, FieldDescriptorSet, ScalarType, Shape};
    /// use bindery_extract::Validator;
    /// use serde_json::json;
    ///
    /// let shape = Shape::new("Person")
    ///     .field(Field::scalar("name", ScalarType::String).validate("required"))
    ///     .field(Field::scalar("age", ScalarType::I32).validate("min=1,max=150"));
    /// let set = FieldDescriptorSet::classify(&shape).unwrap();
    ///
    /// let bound = json!({"name": "", "age": 200});
    /// let err = Validator::new().validate(&set, bound.as_object().unwrap()).unwrap_err();
    /// assert_eq!(err.errors.len(), 2);
    /// assert_eq!(err.errors[0].message, "this field is required");
    /// assert_eq!(err.errors[1].message, "must be at most 150");
    /// ```
    pub fn validate(
        &self,
        set: &FieldDescriptorSet,
        object: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        self.collect(set, object, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }

    fn collect(
        &self,
        set: &FieldDescriptorSet,
        object: &Map<String, Value>,
        errors: &mut Vec<FieldError>,
    ) {
        for field in set.fields() {
            let value = object.get(field.binding_key()).unwrap_or(&Value::Null);
            if let Some(rule) = self.first_failure(field, value) {
                errors.push(FieldError {
                    field: field.name.clone(),
                    message: failure_message(rule),
                });
            }
            if let (Kind::NestedObject(nested), Value::Object(inner)) = (&field.kind, value) {
                self.collect(nested, inner, errors);
            }
        }
    }

    fn first_failure<'a>(
        &self,
        field: &'a FieldDescriptor,
        value: &Value,
    ) -> Option<&'a ConstraintRule> {
        let empty = is_zero(&field.kind, value);
        let unset_optional = field.optional && value.is_null();
        let omit_empty = field.has_rule(&ConstraintKind::OmitEmpty);

        field.constraints.iter().find(|rule| match rule.kind {
            ConstraintKind::Required if field.optional => value.is_null(),
            ConstraintKind::Required => empty,
            ConstraintKind::OmitEmpty => false,
            _ if unset_optional || (omit_empty && empty) => false,
            _ => !self.passes(rule, value),
        })
    }

    fn passes(&self, rule: &ConstraintRule, value: &Value) -> bool {
        match &rule.kind {
            ConstraintKind::Required | ConstraintKind::OmitEmpty => true,
            ConstraintKind::Min => compare(value, rule, |m, p| m >= p),
            ConstraintKind::Max => compare(value, rule, |m, p| m <= p),
            ConstraintKind::Len => compare(value, rule, |m, p| (m - p).abs() < f64::EPSILON),
            ConstraintKind::Gte => compare(value, rule, |m, p| m >= p),
            ConstraintKind::Lte => compare(value, rule, |m, p| m <= p),
            ConstraintKind::Gt => compare(value, rule, |m, p| m > p),
            ConstraintKind::Lt => compare(value, rule, |m, p| m < p),
            ConstraintKind::OneOf => text_of(value)
                .is_some_and(|text| rule.choices().iter().any(|choice| *choice == text)),
            ConstraintKind::Email => value.as_str().is_some_and(is_valid_email),
            ConstraintKind::Url => value.as_str().is_some_and(is_valid_url),
            ConstraintKind::Uuid => value.as_str().is_some_and(is_valid_uuid),
            ConstraintKind::Datetime => value
                .as_str()
                .is_some_and(|s| is_valid_datetime(s, &rule.param)),
            ConstraintKind::Custom(tag) => self
                .custom
                .get(tag)
                .is_some_and(|check| check(value, &rule.param)),
        }
    }
}

/// Message for a failing rule.
#[must_use]
pub fn failure_message(rule: &ConstraintRule) -> String {
    let param = &rule.param;
    match &rule.kind {
        ConstraintKind::Required => "this field is required".to_string(),
        ConstraintKind::Email => "must be a valid email address".to_string(),
        ConstraintKind::Url => "must be a valid URI".to_string(),
        ConstraintKind::Uuid => "must be a valid UUID".to_string(),
        ConstraintKind::Min => format!("must be at least {param}"),
        ConstraintKind::Max => format!("must be at most {param}"),
        ConstraintKind::Gte => format!("must be greater than or equal to {param}"),
        ConstraintKind::Lte => format!("must be less than or equal to {param}"),
        ConstraintKind::Gt => format!("must be greater than {param}"),
        ConstraintKind::Lt => format!("must be less than {param}"),
        ConstraintKind::Len => format!("must have length {param}"),
        ConstraintKind::OneOf => format!("must be one of: {param}"),
        ConstraintKind::Datetime => "must be a valid date-time".to_string(),
        ConstraintKind::OmitEmpty | ConstraintKind::Custom(_) => {
            format!("failed {} validation", rule.kind.tag())
        }
    }
}

fn is_zero(kind: &Kind, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        // A nested object is present once bound.
        Value::Object(_) => !matches!(kind, Kind::NestedObject(_)),
    }
}

// Strings measure in chars, lists in items, numbers by value.
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn compare(value: &Value, rule: &ConstraintRule, ok: impl Fn(f64, f64) -> bool) -> bool {
    match (measure(value), rule.numeric_param()) {
        (Some(measured), Some(bound)) => ok(measured, bound),
        _ => false,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(concat!(
                r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
                r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
                r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
            ))
            .ok()
        })
        .as_ref()
}

/// Returns true if `value` looks like an email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, _)) = value.split_once('@') else {
        return false;
    };
    !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
        && email_regex().is_some_and(|re| re.is_match(value))
}

fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

// Canonical hyphenated form only.
fn is_valid_uuid(value: &str) -> bool {
    value.len() == 36 && uuid::Uuid::parse_str(value).is_ok()
}

fn is_valid_datetime(value: &str, layout: &str) -> bool {
    if layout.is_empty() {
        return DateTime::parse_from_rfc3339(value).is_ok();
    }
    DateTime::parse_from_str(value, layout).is_ok()
        || NaiveDateTime::parse_from_str(value, layout).is_ok()
        || NaiveDate::parse_from_str(value, layout).is_ok()
        || NaiveTime::parse_from_str(value, layout).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{Field, ScalarType, Shape};
    use serde_json::json;

    fn check(shape: Shape, bound: Value) -> Result<(), ValidationError> {
        let set = FieldDescriptorSet::classify(&shape).unwrap();
        Validator::new().validate(&set, bound.as_object().unwrap())
    }

    fn single(field: Field, value: Value) -> Option<String> {
        let name = field.name().to_string();
        check(Shape::new("S").field(field), json!({ name: value }))
            .err()
            .map(|e| e.errors[0].message.clone())
    }

    #[test]
    fn test_required_semantics() {
        let required = |f: Field| f.validate("required");
        assert!(single(required(Field::scalar("s", ScalarType::String)), json!("")).is_some());
        assert!(single(required(Field::scalar("s", ScalarType::String)), json!("x")).is_none());
        assert!(single(required(Field::scalar("n", ScalarType::I32)), json!(0)).is_some());
        assert!(single(required(Field::scalar("b", ScalarType::Bool)), json!(false)).is_some());
        assert!(single(required(Field::optional("o", ScalarType::String)), json!(null)).is_some());
        assert!(single(required(Field::optional("o", ScalarType::String)), json!("")).is_none());
        assert!(single(required(Field::list("l", ScalarType::I32)), json!([])).is_some());
        assert_eq!(
            single(required(Field::scalar("s", ScalarType::String)), json!("")),
            Some("this field is required".to_string())
        );
    }

    #[test]
    fn test_bounds_by_kind() {
        let name = || Field::scalar("name", ScalarType::String).validate("min=2,max=5");
        assert_eq!(single(name(), json!("a")), Some("must be at least 2".to_string()));
        assert_eq!(single(name(), json!("héllo")), None);
        assert_eq!(single(name(), json!("toolong")), Some("must be at most 5".to_string()));

        let age = || Field::scalar("age", ScalarType::I32).validate("gte=18,lt=65");
        assert_eq!(
            single(age(), json!(17)),
            Some("must be greater than or equal to 18".to_string())
        );
        assert_eq!(single(age(), json!(65)), Some("must be less than 65".to_string()));
        assert_eq!(single(age(), json!(64)), None);

        let tags = || Field::list("tags", ScalarType::String).validate("len=2");
        assert_eq!(single(tags(), json!(["a"])), Some("must have length 2".to_string()));
        assert_eq!(single(tags(), json!(["a", "b"])), None);

        let score = || Field::scalar("score", ScalarType::F64).validate("gt=0,lte=1");
        assert_eq!(single(score(), json!(0.0)), Some("must be greater than 0".to_string()));
        assert_eq!(
            single(score(), json!(1.5)),
            Some("must be less than or equal to 1".to_string())
        );
    }

    #[test]
    fn test_oneof() {
        let status = || {
            Field::scalar("status", ScalarType::String).validate("oneof=active inactive pending")
        };
        assert_eq!(single(status(), json!("active")), None);
        assert_eq!(
            single(status(), json!("deleted")),
            Some("must be one of: active inactive pending".to_string())
        );
        assert!(single(status(), json!("")).is_some());

        let level = || Field::scalar("level", ScalarType::I32).validate("oneof=1 2 3");
        assert_eq!(single(level(), json!(2)), None);
        assert!(single(level(), json!(4)).is_some());
    }

    #[test]
    fn test_formats() {
        let email = || Field::scalar("email", ScalarType::String).validate("email");
        assert_eq!(single(email(), json!("test@example.com")), None);
        assert_eq!(
            single(email(), json!("not-an-email")),
            Some("must be a valid email address".to_string())
        );
        assert!(single(email(), json!("a..b@example.com")).is_some());

        let url = || Field::scalar("site", ScalarType::String).validate("url");
        assert_eq!(single(url(), json!("https://example.com/x")), None);
        assert_eq!(single(url(), json!("example.com")), Some("must be a valid URI".to_string()));

        let id = || Field::scalar("id", ScalarType::String).validate("uuid");
        assert_eq!(single(id(), json!("67e55044-10b1-426f-9247-bb680e5fe0c8")), None);
        assert_eq!(
            single(id(), json!("67e5504410b1426f9247bb680e5fe0c8")),
            Some("must be a valid UUID".to_string())
        );

        let at = || Field::scalar("at", ScalarType::String).validate("datetime");
        assert_eq!(single(at(), json!("2024-05-01T10:00:00Z")), None);
        assert_eq!(single(at(), json!("yesterday")), Some("must be a valid date-time".to_string()));

        let day = || Field::scalar("day", ScalarType::String).validate("datetime=%Y-%m-%d");
        assert_eq!(single(day(), json!("2024-05-01")), None);
        assert!(single(day(), json!("01/05/2024")).is_some());
    }

    #[test]
    fn test_optional_unset_skips_rules() {
        let limit = || Field::optional("limit", ScalarType::I32).validate("min=1");
        assert_eq!(single(limit(), json!(null)), None);
        assert!(single(limit(), json!(0)).is_some());
    }

    #[test]
    fn test_omitempty() {
        let field = || Field::scalar("email", ScalarType::String).validate("omitempty,email");
        assert_eq!(single(field(), json!("")), None);
        assert!(single(field(), json!("nope")).is_some());
    }

    #[test]
    fn test_collects_every_failing_field() {
        let shape = Shape::new("SearchQuery")
            .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
            .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"));
        let err = check(shape, json!({"q": "", "page": 0})).unwrap_err();
        assert_eq!(err.message, "validation failed");
        assert_eq!(err.for_field("q").unwrap().message, "this field is required");
        assert_eq!(err.for_field("page").unwrap().message, "must be at least 1");
    }

    #[test]
    fn test_one_error_per_field() {
        let shape = Shape::new("S")
            .field(Field::scalar("email", ScalarType::String).validate("required,email"));
        let err = check(shape, json!({"email": ""})).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "this field is required");
    }

    #[test]
    fn test_nested_objects_are_validated() {
        let address = Shape::new("Address")
            .field(Field::scalar("street", ScalarType::String).validate("required"))
            .field(Field::scalar("city", ScalarType::String).validate("required"));
        let shape = Shape::new("PersonWithAddress")
            .field(Field::scalar("name", ScalarType::String).validate("required"))
            .field(Field::object("address", address).validate("required"));

        let invalid = json!({"name": "alice", "address": {"street": "", "city": ""}});
        let err = check(shape.clone(), invalid).unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["street", "city"]);

        let valid = json!({"name": "alice", "address": {"street": "1 Main", "city": "X"}});
        assert!(check(shape, valid).is_ok());
    }

    #[test]
    fn test_body_fields_use_json_key() {
        let shape = Shape::new("S").field(
            Field::scalar("display_name", ScalarType::String)
                .json("name")
                .validate("required"),
        );
        let err = check(shape.clone(), json!({"name": ""})).unwrap_err();
        assert_eq!(err.errors[0].field, "display_name");
        assert!(check(shape, json!({"name": "x"})).is_ok());
    }

    #[test]
    fn test_custom_rules() {
        let shape =
            Shape::new("S").field(Field::scalar("code", ScalarType::String).validate("upper"));
        let set = FieldDescriptorSet::classify(&shape).unwrap();

        let mut validator = Validator::new();
        assert_eq!(
            validator.check_known(&set),
            Err(UnknownRule { field: "code".to_string(), rule: "upper".to_string() })
        );

        validator.register("upper", |value, _| {
            value.as_str().is_some_and(|s| s == s.to_uppercase())
        });
        assert!(validator.check_known(&set).is_ok());

        let err = validator
            .validate(&set, json!({"code": "abc"}).as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.errors[0].message, "failed upper validation");
        assert!(validator.validate(&set, json!({"code": "ABC"}).as_object().unwrap()).is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let err = ValidationError::new(vec![FieldError {
            field: "Name".to_string(),
            message: "this field is required".to_string(),
        }]);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "message": "validation failed",
                "errors": [{"field": "Name", "message": "this field is required"}]
            })
        );
    }
}
