//! # Bindery Extract
//!
//! Binds HTTP requests into typed inputs and validates them.
//!
//! A route's input is described once by a [`FieldDescriptorSet`]. For each
//! request the [`RequestBinder`] reads every source the set names:
//!
//! | Source | Read from | Notes |
//! |--------|-----------|-------|
//! | body | JSON object | POST, PUT, PATCH or any shape with body fields |
//! | query | URL query string | repeated names fill list fields |
//! | header | request headers | case-insensitive, first value |
//! | path | router parameters | scalars only |
//!
//! Missing fields take their zero value. The [`Validator`] then checks the
//! declared rules. Failures surface as a [`Rejection`]:
//!
//! - binding errors: `400` (`413` for oversized bodies) with `{"message": ...}`
//! - validation errors: `422` with `{"message": "validation failed", "errors": [...]}`
//!
//! ## Example
//!
//! ```rust
//! use bindery_core::{Field, FieldDescriptorSet, ScalarType, Shape};
//! use bindery_extract::{ExtractionContextBuilder, RequestBinder, Validator};
//! use http::{Method, Uri};
//! use std::sync::Arc;
//!
//! let shape = Shape::new("SearchQuery")
//!     .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
//!     .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"));
//! let set = Arc::new(FieldDescriptorSet::classify(&shape).unwrap());
//! let binder = RequestBinder::new(set.clone(), &Method::GET);
//!
//! let ctx = ExtractionContextBuilder::new()
//!     .uri(Uri::from_static("/search?q=rust"))
//!     .build();
//! let bound = binder.bind_value(&ctx).unwrap();
//!
//! // page defaulted to 0 and fails min=1
//! let err = Validator::new().validate(&set, &bound).unwrap_err();
//! assert_eq!(err.errors[0].field, "page");
//! ```
//!
//! [`FieldDescriptorSet`]: bindery_core::FieldDescriptorSet

#![doc(html_root_url = "https://docs.rs/bindery-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod body;
mod context;
mod error;
mod header;
mod query;
mod rejection;
pub mod response;
pub mod validate;

pub use binder::RequestBinder;
pub use body::{decode_object, DEFAULT_MAX_BODY_SIZE};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{BindError, INVALID_BODY_MESSAGE};
pub use header::header_value;
pub use query::QueryValues;
pub use rejection::{message_response, Rejection};
pub use response::{internal_error_response, JsonResponse, JSON_CONTENT_TYPE};
pub use validate::{FieldError, RuleFn, UnknownRule, ValidationError, Validator};
