//! # Bindery Core
//!
//! Core types shared by every Bindery crate.
//!
//! - [`Shape`] / [`Field`] - Explicit declaration of an operation's input or output
//! - [`ScalarType`] / [`parse_scalar`] - Text to typed scalar conversion
//! - [`ConstraintRule`] - Declared validation rules (`required`, `min=1`, ...)
//! - [`FieldDescriptorSet`] - Classification of a shape into path/query/header/body
//! - [`ApiError`] - Business error carrying an explicit HTTP status
//!
//! # Example
//!
//! ```
//! use bindery_core::{Field, FieldDescriptorSet, ScalarType, Shape, Source};
//!
//! let shape = Shape::new("SearchQuery")
//!     .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
//!     .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"));
//!
//! let set = FieldDescriptorSet::classify(&shape).unwrap();
//! assert_eq!(set.fields_from(Source::Query).count(), 2);
//! assert!(!set.has_body_fields());
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod constraint;
pub mod descriptor;
mod error;
pub mod scalar;
pub mod shape;

pub use constraint::{ConstraintKind, ConstraintRule};
pub use descriptor::{method_requires_body, FieldDescriptor, FieldDescriptorSet, Kind, Source};
pub use error::{ApiError, ShapeError};
pub use scalar::{parse_scalar, ScalarParseError, ScalarType};
pub use shape::{Binding, Empty, Field, FieldType, Shape, Shaped};
