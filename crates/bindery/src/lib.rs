//! # Bindery
//!
//! Declare an operation's input once; get request binding, validation and
//! its OpenAPI description from that single declaration.
//!
//! ## Crates
//!
//! - `bindery-core`: shapes, constraint rules, field classification
//! - `bindery-extract`: request binding, validation, JSON responses
//! - `bindery-docs`: OpenAPI document and schema synthesis
//! - `bindery-config`: typed configuration
//! - `bindery-telemetry`: logging setup
//!
//! ## Example
//!
//! ```
//! use bindery::prelude::*;
//! use http::{Method, StatusCode, Uri};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct GetUser {
//!     id: u64,
//!     verbose: Option<bool>,
//! }
//!
//! impl Shaped for GetUser {
//!     fn shape() -> Shape {
//!         Shape::new("GetUser")
//!             .field(Field::scalar("id", ScalarType::U64).path("id"))
//!             .field(Field::optional("verbose", ScalarType::Bool).query("verbose"))
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! impl Shaped for User {
//!     fn shape() -> Shape {
//!         Shape::new("User").field(Field::scalar("id", ScalarType::U64))
//!     }
//! }
//!
//! let mut api = Api::new();
//! let endpoint = api
//!     .get("/users/{id}")
//!     .handler(|_ctx: &ExtractionContext, input: GetUser| async move {
//!         if input.id == 0 {
//!             return Err(HandlerError::from(ApiError::not_found("user not found")));
//!         }
//!         Ok(User { id: input.id })
//!     })
//!     .unwrap();
//!
//! let ctx = ExtractionContextBuilder::new()
//!     .uri(Uri::from_static("/users/7"))
//!     .path_param("id", "7")
//!     .build();
//! let response = tokio_test::block_on(endpoint.call(ctx));
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body().as_ref(), br#"{"id":7}"#);
//!
//! assert!(api.document().operation("/users/{id}", &Method::GET).is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/bindery/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod endpoint;
mod error;
mod route;

pub use api::Api;
pub use endpoint::{BoxFuture, Endpoint};
pub use error::{HandlerError, RegistrationError};
pub use route::RouteBuilder;

pub use bindery_config::{BinderyConfig, ConfigError, ConfigLoader};
pub use bindery_core::{
    ApiError, ConstraintKind, ConstraintRule, Empty, Field, FieldDescriptorSet, ScalarType, Shape,
    ShapeError, Shaped, Source,
};
pub use bindery_docs::{DocsError, ExternalDocumentation, Info, OpenApi};
pub use bindery_extract::{
    ExtractionContext, ExtractionContextBuilder, FieldError, Rejection, ValidationError,
};
pub use bindery_telemetry::{init_logging, LogConfig, LogFormat};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Api, ApiError, Empty, Endpoint, ExtractionContext, ExtractionContextBuilder, Field,
        HandlerError, RegistrationError, ScalarType, Shape, Shaped,
    };
}
