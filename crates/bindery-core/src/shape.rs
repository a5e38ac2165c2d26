//! Shape declarations.
//!
//! A [`Shape`] is the explicit description of an operation's input or
//! output type: one [`Field`] per serde field, each with a type, a binding
//! source and its declared rules. Types implement [`Shaped`] to hand their
//! shape to the registry.
//!
//! The declared field name must be the name serde uses for the field.
//! Body fields are read from the JSON key given by [`Field::json`], which
//! defaults to the declared name.
//!
//! # Example
//!
//! ```
//! use bindery_core::{Field, ScalarType, Shape, Shaped};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     #[serde(rename = "name")]
//!     display_name: String,
//!     dry_run: bool,
//! }
//!
//! impl Shaped for CreateUser {
//!     fn shape() -> Shape {
//!         Shape::new("CreateUser")
//!             .field(Field::scalar("name", ScalarType::String).validate("required,min=2"))
//!             .field(Field::scalar("dry_run", ScalarType::Bool).query("dry_run"))
//!     }
//! }
//!
//! assert_eq!(CreateUser::shape().fields().len(), 2);
//! ```

use crate::constraint::ConstraintRule;
use crate::scalar::ScalarType;
use serde::{Deserialize, Serialize};

/// Types that can describe their own shape.
pub trait Shaped {
    /// Returns the declared shape. Called once per registration.
    fn shape() -> Shape;
}

/// Declared structure of an input or output type.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: String,
    fields: Vec<Field>,
}

impl Shape {
    /// Creates an empty shape. The name becomes the schema component name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields.
    #[must_use]
    pub fn fields_from(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Shape name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A plain scalar; absent input yields the zero value.
    Scalar(ScalarType),
    /// `Option<T>` of a scalar; absent input leaves it unset.
    Optional(ScalarType),
    /// `Vec<T>` of a scalar.
    List(ScalarType),
    /// A nested object read from the body.
    Object(Shape),
}

/// Where a field's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// JSON body key.
    Body,
    /// Query parameter with the given name.
    Query(String),
    /// Header with the given name.
    Header(String),
    /// Path parameter with the given name.
    Path(String),
    /// Not bound and not documented.
    Skip,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    ty: FieldType,
    binding: Binding,
    json_name: Option<String>,
    rules: Vec<ConstraintRule>,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            binding: Binding::Body,
            json_name: None,
            rules: Vec::new(),
        }
    }

    /// A plain scalar field.
    #[must_use]
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(ty))
    }

    /// An optional scalar field.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::Optional(ty))
    }

    /// A list of scalars.
    #[must_use]
    pub fn list(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::List(ty))
    }

    /// A nested object.
    #[must_use]
    pub fn object(name: impl Into<String>, shape: Shape) -> Self {
        Self::new(name, FieldType::Object(shape))
    }

    /// Binds the field to a query parameter. An empty name means the declared name.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>) -> Self {
        self.binding = Binding::Query(name.into());
        self
    }

    /// Binds the field to a header. An empty name means the declared name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.binding = Binding::Header(name.into());
        self
    }

    /// Binds the field to a path parameter. An empty name means the declared name.
    #[must_use]
    pub fn path(mut self, name: impl Into<String>) -> Self {
        self.binding = Binding::Path(name.into());
        self
    }

    /// Sets the JSON key for a body field.
    ///
    /// Has no effect on where a query, header or path field is read from.
    #[must_use]
    pub fn json(mut self, key: impl Into<String>) -> Self {
        self.json_name = Some(key.into());
        self
    }

    /// Excludes the field from binding and documentation.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.binding = Binding::Skip;
        self
    }

    /// Appends rules from a declared list such as `"required,max=150"`.
    #[must_use]
    pub fn validate(mut self, rules: &str) -> Self {
        self.rules.extend(ConstraintRule::parse_list(rules));
        self
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Declared binding.
    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// JSON key override, if any.
    #[must_use]
    pub fn json_name(&self) -> Option<&str> {
        self.json_name.as_deref()
    }

    /// Declared rules in order.
    #[must_use]
    pub fn rules(&self) -> &[ConstraintRule] {
        &self.rules
    }
}

/// A shape with no fields, for operations that take or return nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl Shaped for Empty {
    fn shape() -> Shape {
        Shape::new("Empty")
    }
}
