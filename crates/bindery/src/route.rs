//! Route options.

use std::future::Future;
use std::sync::Arc;

use bindery_core::Shaped;
use bindery_extract::ExtractionContext;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Api, Endpoint, HandlerError, RegistrationError};

/// Options for one route, finished by [`RouteBuilder::handler`].
///
/// # Example
///
/// ```
/// use bindery::prelude::*;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// impl Shaped for CreateUser {
///     fn shape() -> Shape {
///         Shape::new("CreateUser")
///             .field(Field::scalar("name", ScalarType::String).validate("required"))
///     }
/// }
///
/// #[derive(Serialize)]
/// struct User {
///     name: String,
/// }
///
/// impl Shaped for User {
///     fn shape() -> Shape {
///         Shape::new("User").field(Field::scalar("name", ScalarType::String))
///     }
/// }
///
/// let mut api = Api::new();
/// api.post("/users")
///     .status(201)
///     .summary("Create a user")
///     .tags(["users"])
///     .handler(|_ctx: &ExtractionContext, input: CreateUser| async move {
///         Ok::<_, HandlerError>(User { name: input.name })
///     })
///     .unwrap();
///
/// let operation = api.document().operation("/users", &http::Method::POST).unwrap();
/// assert_eq!(operation.operation_id, "postUsers");
/// assert!(operation.responses.contains_key("201"));
/// ```
#[must_use = "a route is only registered once `handler` is called"]
pub struct RouteBuilder<'a> {
    api: &'a mut Api,
    options: RouteOptions,
}

impl<'a> RouteBuilder<'a> {
    pub(crate) fn new(api: &'a mut Api, method: Method, path: String) -> Self {
        Self {
            api,
            options: RouteOptions {
                method,
                path,
                status: 200,
                summary: None,
                description: None,
                tags: Vec::new(),
            },
        }
    }

    /// Success status. Defaults to 200.
    pub fn status(mut self, status: u16) -> Self {
        self.options.status = status;
        self
    }

    /// Short summary for the document.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.options.summary = Some(summary.into());
        self
    }

    /// Long description for the document.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    /// Grouping tags for the document.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Registers the route with its handler.
    ///
    /// The input and output shapes are classified (or taken from the
    /// cache), the operation is added to the document, and the returned
    /// endpoint is ready to serve requests.
    ///
    /// # Errors
    ///
    /// Fails if a shape cannot be classified, a rule tag is unknown, a
    /// path field has no segment in the template, the status is invalid,
    /// the method is unsupported or the route is already registered.
    pub fn handler<In, Out, F, Fut>(
        self,
        handler: F,
    ) -> Result<Arc<dyn Endpoint>, RegistrationError>
    where
        In: Shaped + DeserializeOwned + Send + 'static,
        Out: Shaped + Serialize + Send + 'static,
        F: Fn(&ExtractionContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, HandlerError>> + Send + 'static,
    {
        self.api.register(self.options, handler)
    }
}

#[derive(Debug)]
pub(crate) struct RouteOptions {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) status: u16,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) tags: Vec<String>,
}
