//! Request execution for one registered route.
//!
//! An [`Endpoint`] runs the per-request pipeline: bind, validate, call the
//! handler, encode the response. The external router looks endpoints up by
//! method and path and hands them an [`ExtractionContext`] carrying the
//! matched path parameters.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use bindery_extract::{ExtractionContext, JsonResponse, RequestBinder, Validator};
use bindery_telemetry::fields;
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::HandlerError;

/// A boxed future, as returned by [`Endpoint::call`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A registered route, ready to serve requests.
pub trait Endpoint: Send + Sync {
    /// Route method.
    fn method(&self) -> &Method;

    /// Route template, e.g. `/users/{id}`.
    fn path(&self) -> &str;

    /// Documented operation id.
    fn operation_id(&self) -> &str;

    /// Serves one request. Never fails: every error becomes a response.
    fn call(&self, ctx: ExtractionContext) -> BoxFuture<'_, Response<Bytes>>;
}

/// Identity of a route, shared by its endpoint and its log lines.
#[derive(Debug, Clone)]
pub(crate) struct RouteInfo {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) operation_id: String,
}

/// Endpoint for a handler taking `In` and returning `Out`.
pub(crate) struct TypedEndpoint<In, Out, F, Fut> {
    route: RouteInfo,
    status: StatusCode,
    binder: RequestBinder,
    validator: Arc<Validator>,
    handler: F,
    _types: PhantomData<fn(In) -> (Out, Fut)>,
}

impl<In, Out, F, Fut> TypedEndpoint<In, Out, F, Fut> {
    pub(crate) fn new(
        route: RouteInfo,
        status: StatusCode,
        binder: RequestBinder,
        validator: Arc<Validator>,
        handler: F,
    ) -> Self {
        Self {
            route,
            status,
            binder,
            validator,
            handler,
            _types: PhantomData,
        }
    }

    // HEAD answers with the headers and status of GET but no body.
    fn finish(&self, mut response: Response<Bytes>) -> Response<Bytes> {
        if self.route.method == Method::HEAD {
            *response.body_mut() = Bytes::new();
        }
        response
    }
}

impl<In, Out, F, Fut> Endpoint for TypedEndpoint<In, Out, F, Fut>
where
    In: DeserializeOwned + Send + 'static,
    Out: Serialize + Send + 'static,
    F: Fn(&ExtractionContext, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, HandlerError>> + Send + 'static,
{
    fn method(&self) -> &Method {
        &self.route.method
    }

    fn path(&self) -> &str {
        &self.route.path
    }

    fn operation_id(&self) -> &str {
        &self.route.operation_id
    }

    fn call(&self, ctx: ExtractionContext) -> BoxFuture<'_, Response<Bytes>> {
        Box::pin(async move {
            let input = match self.binder.extract::<In>(&ctx, &self.validator) {
                Ok(input) => input,
                Err(rejection) => {
                    tracing::debug!(
                        { fields::OPERATION_ID } = %self.route.operation_id,
                        { fields::HTTP_STATUS } = rejection.status_code().as_u16(),
                        { fields::ERROR_CODE } = rejection.error_code(),
                        { fields::ERROR } = %rejection,
                        "request rejected"
                    );
                    return self.finish(rejection.into_response());
                }
            };

            let response = match (self.handler)(&ctx, input).await {
                Ok(output) => JsonResponse::new(output).with_status(self.status).into_response(),
                Err(err) => {
                    if err.is_internal() {
                        tracing::error!(
                            { fields::OPERATION_ID } = %self.route.operation_id,
                            { fields::HTTP_METHOD } = %self.route.method,
                            { fields::HTTP_PATH } = ctx.path(),
                            { fields::ERROR } = ?err,
                            "handler failed"
                        );
                    }
                    err.into_response()
                }
            };
            self.finish(response)
        })
    }
}
