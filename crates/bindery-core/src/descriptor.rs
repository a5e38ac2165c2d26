//! Field classification.
//!
//! [`FieldDescriptorSet::classify`] turns a declared [`Shape`] into an
//! immutable set of [`FieldDescriptor`]s, one per bound field, each with a
//! single [`Source`]. The set is built once at registration and then shared
//! read-only by the request binder and the schema synthesizer.

use crate::constraint::{ConstraintKind, ConstraintRule};
use crate::error::ShapeError;
use crate::scalar::ScalarType;
use crate::shape::{Binding, Field, FieldType, Shape};
use http::Method;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// The part of a request a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// `{name}` segment of the route path.
    Path,
    /// URL query string.
    Query,
    /// Request header.
    Header,
    /// JSON request body.
    Body,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Shape of a field's value, fixed at classification time.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// A plain scalar.
    Scalar(ScalarType),
    /// A scalar that may be unset.
    OptionalScalar(ScalarType),
    /// Repeated scalar values.
    SliceOfScalar(ScalarType),
    /// A nested object with its own descriptors.
    NestedObject(Arc<FieldDescriptorSet>),
}

impl Kind {
    /// The scalar type, for every kind except nested objects.
    #[must_use]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(ty) | Self::OptionalScalar(ty) | Self::SliceOfScalar(ty) => Some(*ty),
            Self::NestedObject(_) => None,
        }
    }

    /// The value held when no input was supplied.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Scalar(ty) => ty.zero_value(),
            Self::OptionalScalar(_) => Value::Null,
            Self::SliceOfScalar(_) => Value::Array(Vec::new()),
            Self::NestedObject(set) => Value::Object(set.zero_object()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Scalar(ty) => ty.to_string(),
            Self::OptionalScalar(ty) => format!("optional {ty}"),
            Self::SliceOfScalar(ty) => format!("list of {ty}"),
            Self::NestedObject(set) => format!("object {}", set.shape_name()),
        }
    }
}

/// Classification of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared name. Reported in validation errors.
    pub name: String,
    /// Where the value is read from.
    pub source: Source,
    /// Name on the wire: query/header/path name or JSON key.
    pub external_name: String,
    /// Value shape.
    pub kind: Kind,
    /// True iff the field may be unset.
    pub optional: bool,
    /// Declared rules in order.
    pub constraints: Vec<ConstraintRule>,
}

impl FieldDescriptor {
    /// Key the field occupies in the bound object handed to serde.
    ///
    /// Body fields live under their JSON key. Every other source writes
    /// under the declared name.
    #[must_use]
    pub fn binding_key(&self) -> &str {
        match self.source {
            Source::Body => &self.external_name,
            Source::Path | Source::Query | Source::Header => &self.name,
        }
    }

    /// Returns true if the field declares a rule of this kind.
    #[must_use]
    pub fn has_rule(&self, kind: &ConstraintKind) -> bool {
        self.constraints.iter().any(|rule| &rule.kind == kind)
    }

    /// Returns true if the field carries a `required` rule.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.has_rule(&ConstraintKind::Required)
    }
}

/// Classification result for a whole shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptorSet {
    shape_name: String,
    fields: Vec<FieldDescriptor>,
    skipped: Vec<String>,
}

impl FieldDescriptorSet {
    /// Classifies every field of `shape`.
    ///
    /// Classification is pure: the same shape always yields an equal set.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] when a field's type cannot be read from its
    /// declared source, when names collide, when a nested object declares a
    /// non-body binding, or when a rule does not fit the field.
    pub fn classify(shape: &Shape) -> Result<Self, ShapeError> {
        classify_shape(shape, false)
    }

    /// Shape name.
    #[must_use]
    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    /// Descriptors in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptors read from `source`, in declaration order.
    pub fn fields_from(&self, source: Source) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |field| field.source == source)
    }

    /// Returns true if any field is read from the body.
    #[must_use]
    pub fn has_body_fields(&self) -> bool {
        self.fields_from(Source::Body).next().is_some()
    }

    /// Declared names of skipped fields.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// An object holding every field's zero value under its binding key.
    #[must_use]
    pub fn zero_object(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.binding_key().to_string(), field.kind.zero_value()))
            .collect()
    }
}

/// Methods that always carry a JSON body, whatever the shape declares.
#[must_use]
pub fn method_requires_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn classify_shape(shape: &Shape, nested: bool) -> Result<FieldDescriptorSet, ShapeError> {
    let mut fields = Vec::with_capacity(shape.fields().len());
    let mut skipped = Vec::new();
    let mut names = HashSet::new();
    let mut wire_names = HashSet::new();
    let mut keys = HashSet::new();

    for field in shape.fields() {
        if !names.insert(field.name()) {
            return Err(ShapeError::DuplicateField {
                shape: shape.name().to_string(),
                field: field.name().to_string(),
            });
        }

        let (source, external_name) = match field.binding() {
            Binding::Skip => {
                if !keys.insert(field.name().to_string()) {
                    return Err(ShapeError::DuplicateField {
                        shape: shape.name().to_string(),
                        field: field.name().to_string(),
                    });
                }
                skipped.push(field.name().to_string());
                continue;
            }
            Binding::Body => (
                Source::Body,
                field.json_name().unwrap_or(field.name()).to_string(),
            ),
            Binding::Query(wire) => (Source::Query, wire_or_name(wire, field)),
            Binding::Header(wire) => (Source::Header, wire_or_name(wire, field)),
            Binding::Path(wire) => (Source::Path, wire_or_name(wire, field)),
        };

        if nested && source != Source::Body {
            return Err(ShapeError::NestedBinding {
                shape: shape.name().to_string(),
                field: field.name().to_string(),
                binding: source,
            });
        }

        // Body keys and declared names share one serde namespace.
        let key = match source {
            Source::Body => external_name.clone(),
            _ => field.name().to_string(),
        };
        if !keys.insert(key.clone()) {
            return Err(ShapeError::DuplicateField {
                shape: shape.name().to_string(),
                field: key,
            });
        }

        // Header names are case-insensitive on the wire.
        let wire_key = match source {
            Source::Header => external_name.to_ascii_lowercase(),
            _ => external_name.clone(),
        };
        if !wire_names.insert((source, wire_key)) {
            return Err(ShapeError::DuplicateWireName {
                shape: shape.name().to_string(),
                binding: source,
                name: external_name,
            });
        }

        let kind = match field.ty() {
            FieldType::Scalar(ty) => Kind::Scalar(*ty),
            FieldType::Optional(ty) => Kind::OptionalScalar(*ty),
            FieldType::List(ty) => Kind::SliceOfScalar(*ty),
            FieldType::Object(inner) => Kind::NestedObject(Arc::new(classify_shape(inner, true)?)),
        };
        check_kind(shape, field, source, &kind)?;
        check_rules(shape, field, &kind)?;

        fields.push(FieldDescriptor {
            name: field.name().to_string(),
            source,
            external_name,
            optional: matches!(kind, Kind::OptionalScalar(_)),
            kind,
            constraints: field.rules().to_vec(),
        });
    }

    Ok(FieldDescriptorSet {
        shape_name: shape.name().to_string(),
        fields,
        skipped,
    })
}

fn wire_or_name(wire: &str, field: &Field) -> String {
    if wire.is_empty() {
        field.name().to_string()
    } else {
        wire.to_string()
    }
}

fn check_kind(shape: &Shape, field: &Field, source: Source, kind: &Kind) -> Result<(), ShapeError> {
    let supported = match source {
        Source::Body => true,
        Source::Query => !matches!(kind, Kind::NestedObject(_)),
        Source::Header => matches!(kind, Kind::Scalar(_) | Kind::OptionalScalar(_)),
        Source::Path => matches!(kind, Kind::Scalar(_)),
    };
    if supported {
        Ok(())
    } else {
        Err(ShapeError::UnsupportedKind {
            shape: shape.name().to_string(),
            field: field.name().to_string(),
            binding: source,
            kind: kind.describe(),
        })
    }
}

fn check_rules(shape: &Shape, field: &Field, kind: &Kind) -> Result<(), ShapeError> {
    let invalid = |rule: &ConstraintRule, reason: &str| ShapeError::InvalidRule {
        shape: shape.name().to_string(),
        field: field.name().to_string(),
        rule: rule.to_string(),
        reason: reason.to_string(),
    };

    let scalar = kind.scalar_type();
    let is_list = matches!(kind, Kind::SliceOfScalar(_));

    for rule in field.rules() {
        let kind_of_rule = &rule.kind;
        if kind_of_rule.is_bound() {
            match scalar {
                None | Some(ScalarType::Bool) => {
                    return Err(invalid(rule, "does not apply to this field type"));
                }
                Some(ty) if ty.is_string() || is_list => {
                    if rule.numeric_param().is_none() {
                        return Err(invalid(rule, "needs a numeric param"));
                    }
                    let counts = matches!(
                        kind_of_rule,
                        ConstraintKind::Min | ConstraintKind::Max | ConstraintKind::Len
                    );
                    if counts && rule.count_param().is_none() {
                        return Err(invalid(rule, "needs a non-negative integer param"));
                    }
                }
                Some(_) => {
                    if rule.numeric_param().is_none() {
                        return Err(invalid(rule, "needs a numeric param"));
                    }
                }
            }
        } else if kind_of_rule.is_format() {
            if is_list || scalar != Some(ScalarType::String) {
                return Err(invalid(rule, "only applies to string fields"));
            }
        } else if *kind_of_rule == ConstraintKind::OneOf {
            if rule.choices().is_empty() {
                return Err(invalid(rule, "needs at least one value"));
            }
            if scalar.is_none() || is_list {
                return Err(invalid(rule, "only applies to scalar fields"));
            }
        }
    }
    Ok(())
}
