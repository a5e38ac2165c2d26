//! The route registry and its API document.

use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bindery_config::{BinderyConfig, DocsConfig};
use bindery_core::{FieldDescriptorSet, Shaped, Source};
use bindery_docs::{
    path_parameters, synthesize, Contact, DocsError, ExternalDocumentation, Info, License,
    OpenApi, PathItem,
};
use bindery_extract::{ExtractionContext, RequestBinder, Validator};
use bindery_telemetry::fields;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::endpoint::{RouteInfo, TypedEndpoint};
use crate::route::{RouteBuilder, RouteOptions};
use crate::{Endpoint, HandlerError, RegistrationError};

/// Registry of routes and the document describing them.
///
/// Registration classifies each input and output shape once, checks it,
/// documents the operation and returns an [`Endpoint`]. Registration needs
/// `&mut Api`; endpoints are immutable and shared across requests.
///
/// # Example
///
/// ```
/// use bindery::prelude::*;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Search {
///     q: String,
///     page: i64,
/// }
///
/// impl Shaped for Search {
///     fn shape() -> Shape {
///         Shape::new("Search")
///             .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
///             .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"))
///     }
/// }
///
/// #[derive(Serialize)]
/// struct Results {
///     hits: Vec<String>,
/// }
///
/// impl Shaped for Results {
///     fn shape() -> Shape {
///         Shape::new("Results").field(Field::list("hits", ScalarType::String))
///     }
/// }
///
/// let mut api = Api::new();
/// api.get("/search")
///     .handler(|_ctx: &ExtractionContext, input: Search| async move {
///         Ok::<_, HandlerError>(Results { hits: vec![input.q] })
///     })
///     .unwrap();
///
/// let json = api.document_json().unwrap();
/// assert!(json.contains("getSearch"));
/// ```
pub struct Api {
    document: OpenApi,
    validator: Arc<Validator>,
    descriptors: HashMap<TypeId, Arc<FieldDescriptorSet>>,
    endpoints: Vec<Arc<dyn Endpoint>>,
    max_body_size: usize,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("title", &self.document.info.title)
            .field("routes", &self.endpoints.len())
            .field("shapes", &self.descriptors.len())
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Creates a registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&BinderyConfig::default())
    }

    /// Creates a registry from loaded configuration: document metadata
    /// from `docs`, the body limit from `binding`.
    #[must_use]
    pub fn from_config(config: &BinderyConfig) -> Self {
        let mut document = OpenApi::new(info_from_config(&config.docs));
        document.external_docs = config
            .docs
            .external_docs
            .as_ref()
            .map(|docs| ExternalDocumentation {
                description: docs.description.clone(),
                url: docs.url.clone(),
            });
        Self {
            document,
            validator: Arc::new(Validator::new()),
            descriptors: HashMap::new(),
            endpoints: Vec::new(),
            max_body_size: config.binding.max_body_bytes,
        }
    }

    /// Replaces the document metadata.
    #[must_use]
    pub fn with_info(mut self, info: Info) -> Self {
        self.document.info = info;
        self
    }

    /// Sets the document's external documentation link.
    #[must_use]
    pub fn with_external_docs(mut self, external_docs: ExternalDocumentation) -> Self {
        self.document.external_docs = Some(external_docs);
        self
    }

    /// Sets the body size limit for routes registered afterwards.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Registers a check for a custom rule tag.
    ///
    /// Register rules before the routes that use them: routes already
    /// registered keep the rules they were registered with.
    pub fn register_rule<F>(&mut self, tag: impl Into<String>, check: F)
    where
        F: Fn(&Value, &str) -> bool + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.validator).register(tag, check);
    }

    /// Starts a route.
    pub fn route(&mut self, method: Method, path: impl Into<String>) -> RouteBuilder<'_> {
        RouteBuilder::new(self, method, path.into())
    }

    /// Starts a GET route.
    pub fn get(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::GET, path)
    }

    /// Starts a POST route.
    pub fn post(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::POST, path)
    }

    /// Starts a PUT route.
    pub fn put(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::PUT, path)
    }

    /// Starts a PATCH route.
    pub fn patch(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::PATCH, path)
    }

    /// Starts a DELETE route.
    pub fn delete(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::DELETE, path)
    }

    /// Starts a HEAD route.
    pub fn head(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::HEAD, path)
    }

    /// Starts an OPTIONS route.
    pub fn options(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::OPTIONS, path)
    }

    /// Starts a TRACE route.
    pub fn trace(&mut self, path: impl Into<String>) -> RouteBuilder<'_> {
        self.route(Method::TRACE, path)
    }

    /// The API document.
    #[must_use]
    pub fn document(&self) -> &OpenApi {
        &self.document
    }

    /// The API document as pretty-printed JSON.
    pub fn document_json(&self) -> Result<String, DocsError> {
        self.document.to_json()
    }

    /// Every registered endpoint, in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<dyn Endpoint>] {
        &self.endpoints
    }

    /// The endpoint registered for `method` on `path`.
    #[must_use]
    pub fn endpoint(&self, method: &Method, path: &str) -> Option<Arc<dyn Endpoint>> {
        self.endpoints
            .iter()
            .find(|e| e.method() == method && e.path() == path)
            .cloned()
    }

    /// Number of distinct shapes classified so far.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns the descriptor set for `T`, classifying it on first use.
    pub fn descriptors<T: Shaped + 'static>(
        &mut self,
    ) -> Result<Arc<FieldDescriptorSet>, RegistrationError> {
        let key = TypeId::of::<T>();
        if let Some(set) = self.descriptors.get(&key) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(FieldDescriptorSet::classify(&T::shape())?);
        self.descriptors.insert(key, Arc::clone(&set));
        Ok(set)
    }

    pub(crate) fn register<In, Out, F, Fut>(
        &mut self,
        options: RouteOptions,
        handler: F,
    ) -> Result<Arc<dyn Endpoint>, RegistrationError>
    where
        In: Shaped + DeserializeOwned + Send + 'static,
        Out: Shaped + Serialize + Send + 'static,
        F: Fn(&ExtractionContext, In) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, HandlerError>> + Send + 'static,
    {
        let RouteOptions {
            method,
            path,
            status,
            summary,
            description,
            tags,
        } = options;

        let status =
            StatusCode::from_u16(status).map_err(|_| RegistrationError::InvalidStatus { status })?;
        if !PathItem::supports(&method) {
            return Err(DocsError::UnsupportedMethod {
                method: method.to_string(),
            }
            .into());
        }

        let input = self.descriptors::<In>()?;
        let output = self.descriptors::<Out>()?;
        self.validator.check_known(&input)?;

        let segments = path_parameters(&path);
        if let Some(field) = input
            .fields_from(Source::Path)
            .find(|field| !segments.contains(&field.external_name))
        {
            return Err(RegistrationError::MissingPathSegment {
                shape: input.shape_name().to_string(),
                field: field.external_name.clone(),
                path,
            });
        }

        let mut synthesized = synthesize(&method, &path, &input, &output, status);
        synthesized.operation.summary = summary;
        synthesized.operation.description = description;
        synthesized.operation.tags = tags;
        let operation_id = synthesized.operation.operation_id.clone();
        self.document.insert_operation(&path, &method, synthesized)?;

        tracing::info!(
            { fields::HTTP_METHOD } = %method,
            { fields::HTTP_PATH } = %path,
            { fields::OPERATION_ID } = %operation_id,
            { fields::SHAPE } = input.shape_name(),
            "route registered"
        );

        let binder = RequestBinder::new(input, &method).with_max_body_size(self.max_body_size);
        let route = RouteInfo {
            method,
            path,
            operation_id,
        };
        let endpoint: Arc<dyn Endpoint> = Arc::new(TypedEndpoint::<In, Out, F, Fut>::new(
            route,
            status,
            binder,
            Arc::clone(&self.validator),
            handler,
        ));
        self.endpoints.push(Arc::clone(&endpoint));
        Ok(endpoint)
    }
}

fn info_from_config(docs: &DocsConfig) -> Info {
    Info {
        title: docs.title.clone(),
        summary: docs.summary.clone(),
        description: docs.description.clone(),
        terms_of_service: docs.terms_of_service.clone(),
        contact: docs.contact.as_ref().map(|c| Contact {
            name: c.name.clone(),
            url: c.url.clone(),
            email: c.email.clone(),
        }),
        license: docs.license.as_ref().map(|l| License {
            name: l.name.clone(),
            url: l.url.clone(),
            identifier: l.identifier.clone(),
        }),
        version: docs.version.clone(),
    }
}
