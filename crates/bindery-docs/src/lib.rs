//! # Bindery Docs
//!
//! OpenAPI 3.0 output for Bindery operations.
//!
//! [`synthesize`] turns a route's method, path and classified input and
//! output shapes into an [`Operation`] plus the component schemas it
//! references. [`OpenApi::insert_operation`] collects operations into one
//! document.
//!
//! ## Example
//!
//! ```rust
//! use bindery_core::{Field, FieldDescriptorSet, ScalarType, Shape};
//! use bindery_docs::{synthesize, Info, OpenApi};
//! use http::{Method, StatusCode};
//!
//! let input = Shape::new("CreateUser")
//!     .field(Field::scalar("name", ScalarType::String).validate("required"));
//! let output = Shape::new("User").field(Field::scalar("id", ScalarType::U64));
//! let input = FieldDescriptorSet::classify(&input).unwrap();
//! let output = FieldDescriptorSet::classify(&output).unwrap();
//!
//! let mut doc = OpenApi::new(Info::new("Users", "1.0.0"));
//! let operation = synthesize(&Method::POST, "/users", &input, &output, StatusCode::CREATED);
//! doc.insert_operation("/users", &Method::POST, operation).unwrap();
//!
//! assert!(doc.components.schemas.contains_key("CreateUser"));
//! assert!(doc.to_json().unwrap().contains("postUsers"));
//! ```

mod error;
mod openapi;
mod synth;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    Components, Contact, ExternalDocumentation, Info, License, MediaType, OpenApi, Operation,
    Parameter, ParameterIn, PathItem, RequestBody, Response, Schema, SchemaType, OPENAPI_VERSION,
};
pub use synth::{operation_id, path_parameters, synthesize, SynthesizedOperation};
