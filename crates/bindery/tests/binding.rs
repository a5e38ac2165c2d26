//! End-to-end request handling through registered endpoints.

use std::future::{ready, Ready};
use std::sync::Arc;

use bindery::prelude::*;
use bytes::Bytes;
use http::{Method, Response, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn body_json(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn echo<T: Serialize>(_ctx: &ExtractionContext, input: T) -> Ready<Result<Echo, HandlerError>> {
    ready(Ok(Echo {
        input: serde_json::to_value(input).unwrap(),
    }))
}

#[derive(Serialize)]
struct Echo {
    input: Value,
}

impl Shaped for Echo {
    fn shape() -> Shape {
        Shape::new("Echo").field(Field::object("input", Shape::new("Input")))
    }
}

// ============================================================================
// Search: query-only shape
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
struct Search {
    q: String,
    page: i64,
    tags: Vec<String>,
    limit: Option<u32>,
}

impl Shaped for Search {
    fn shape() -> Shape {
        Shape::new("Search")
            .field(Field::scalar("q", ScalarType::String).query("q").validate("required"))
            .field(Field::scalar("page", ScalarType::I64).query("page").validate("min=1"))
            .field(Field::list("tags", ScalarType::String).query("tag"))
            .field(Field::optional("limit", ScalarType::U32).query("limit"))
    }
}

fn search_endpoint() -> Arc<dyn Endpoint> {
    let mut api = Api::new();
    api.get("/search").handler(echo::<Search>).unwrap()
}

fn get(uri: &'static str) -> ExtractionContext {
    ExtractionContextBuilder::new().uri(Uri::from_static(uri)).build()
}

#[tokio::test]
async fn test_missing_required_and_min_both_reported() {
    let response = search_endpoint().call(get("/search?page=0")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(&response),
        json!({
            "message": "validation failed",
            "errors": [
                {"field": "q", "message": "this field is required"},
                {"field": "page", "message": "must be at least 1"}
            ]
        })
    );
}

#[tokio::test]
async fn test_repeated_query_values_keep_order() {
    let response = search_endpoint()
        .call(get("/search?q=rust&page=1&tag=a&tag=b&tag=c"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response)["input"]["tags"], json!(["a", "b", "c"]));
}

#[tokio::test]
async fn test_optional_query_field_stays_unset() {
    let response = search_endpoint().call(get("/search?q=rust&page=2")).await;
    assert_eq!(body_json(&response)["input"]["limit"], Value::Null);

    let response = search_endpoint().call(get("/search?q=rust&page=2&limit=0")).await;
    assert_eq!(body_json(&response)["input"]["limit"], json!(0));
}

#[tokio::test]
async fn test_bad_query_scalar_is_bad_request() {
    let response = search_endpoint().call(get("/search?q=rust&page=two")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(&response)["message"].as_str().unwrap().to_string();
    assert!(message.contains("page"), "{message}");
}

#[tokio::test]
async fn test_query_overflow_is_bad_request() {
    let response = search_endpoint()
        .call(get("/search?q=rust&page=1&limit=4294967296"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_response_content_type() {
    let response = search_endpoint().call(get("/search?q=rust&page=1")).await;
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
}

// ============================================================================
// Body binding and reconciliation
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
struct CreateItem {
    dry_run: bool,
    tenant: String,
    name: String,
}

impl Shaped for CreateItem {
    fn shape() -> Shape {
        Shape::new("CreateItem")
            .field(Field::scalar("dry_run", ScalarType::Bool).query("dry_run"))
            .field(Field::scalar("tenant", ScalarType::String).header("X-Tenant"))
            .field(Field::scalar("name", ScalarType::String))
    }
}

fn create_endpoint() -> Arc<dyn Endpoint> {
    let mut api = Api::new();
    api.post("/items").status(201).handler(echo::<CreateItem>).unwrap()
}

fn post(uri: &'static str, body: &'static str) -> ExtractionContextBuilder {
    ExtractionContextBuilder::new()
        .method(Method::POST)
        .uri(Uri::from_static(uri))
        .body(body)
}

#[tokio::test]
async fn test_body_cannot_smuggle_query_or_header_fields() {
    let ctx = post("/items", r#"{"dry_run": true, "tenant": "evil", "name": "widget"}"#).build();
    let response = create_endpoint().call(ctx).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(&response)["input"],
        json!({"dry_run": false, "tenant": "", "name": "widget"})
    );
}

#[tokio::test]
async fn test_query_and_header_win_over_body() {
    let ctx = post("/items?dry_run=true", r#"{"dry_run": false, "tenant": "evil", "name": "w"}"#)
        .header("x-tenant", "acme")
        .build();
    let response = create_endpoint().call(ctx).await;

    assert_eq!(
        body_json(&response)["input"],
        json!({"dry_run": true, "tenant": "acme", "name": "w"})
    );
}

#[tokio::test]
async fn test_empty_object_body_binds_zero_values() {
    let response = create_endpoint().call(post("/items", "{}").build()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(&response)["input"]["name"], json!(""));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let response = create_endpoint().call(post("/items", "{\"name\":").build()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&response), json!({"message": "invalid request body"}));
}

#[derive(Debug, Deserialize, Serialize)]
struct Trigger {
    job: String,
}

impl Shaped for Trigger {
    fn shape() -> Shape {
        Shape::new("Trigger").field(Field::scalar("job", ScalarType::String).path("job"))
    }
}

#[tokio::test]
async fn test_post_without_body_fields_still_needs_a_body() {
    let mut api = Api::new();
    let endpoint = api.post("/jobs/{job}/run").handler(echo::<Trigger>).unwrap();

    let ctx = ExtractionContextBuilder::new()
        .method(Method::POST)
        .path_param("job", "nightly")
        .build();
    assert_eq!(endpoint.call(ctx).await.status(), StatusCode::BAD_REQUEST);

    let ctx = ExtractionContextBuilder::new()
        .method(Method::POST)
        .path_param("job", "nightly")
        .body("{}")
        .build();
    let response = endpoint.call(ctx).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response)["input"]["job"], json!("nightly"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut api = Api::new().with_max_body_size(16);
    let endpoint = api.post("/items").handler(echo::<CreateItem>).unwrap();

    let ctx = post("/items", r#"{"name": "a name well over sixteen bytes"}"#).build();
    let response = endpoint.call(ctx).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// Nested objects and custom rules
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
struct Address {
    city: String,
    zip: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct Signup {
    email: String,
    handle: String,
    address: Address,
}

impl Shaped for Signup {
    fn shape() -> Shape {
        let address = Shape::new("Address")
            .field(Field::scalar("city", ScalarType::String).validate("required"))
            .field(Field::scalar("zip", ScalarType::String).validate("len=5"));
        Shape::new("Signup")
            .field(Field::scalar("email", ScalarType::String).validate("required,email"))
            .field(Field::scalar("handle", ScalarType::String).validate("lowercase"))
            .field(Field::object("address", address))
    }
}

fn signup_endpoint() -> Arc<dyn Endpoint> {
    let mut api = Api::new();
    api.register_rule("lowercase", |value, _| {
        value.as_str().is_some_and(|s| !s.chars().any(char::is_uppercase))
    });
    api.post("/signup").handler(echo::<Signup>).unwrap()
}

#[tokio::test]
async fn test_nested_and_custom_rules_collected() {
    let ctx = post(
        "/signup",
        r#"{"email": "not-an-email", "handle": "Bob", "address": {"zip": "123"}}"#,
    )
    .build();
    let response = signup_endpoint().call(ctx).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body_json(&response)["errors"].as_array().unwrap().clone();
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields.len(), 4, "{errors:?}");
    assert!(errors.contains(&json!({"field": "handle", "message": "failed lowercase validation"})));
    assert!(fields.iter().any(|f| f.contains("city")));
    assert!(fields.iter().any(|f| f.contains("zip")));
}

#[tokio::test]
async fn test_valid_signup_passes() {
    let body = r#"{
        "email": "bob@example.com",
        "handle": "bob",
        "address": {"city": "Oslo", "zip": "01500"}
    }"#;
    let ctx = post("/signup", body).build();
    let response = signup_endpoint().call(ctx).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response)["input"]["address"]["city"], json!("Oslo"));
}

// ============================================================================
// Handler errors and HEAD
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetUser {
    id: u64,
}

impl Shaped for GetUser {
    fn shape() -> Shape {
        Shape::new("GetUser").field(Field::scalar("id", ScalarType::U64).path("id"))
    }
}

#[derive(Serialize)]
struct User {
    id: u64,
}

impl Shaped for User {
    fn shape() -> Shape {
        Shape::new("User").field(Field::scalar("id", ScalarType::U64))
    }
}

fn load_user(ctx: &ExtractionContext, input: GetUser) -> Ready<Result<User, HandlerError>> {
    let traced = ctx.header("x-trace").is_some();
    ready(match input.id {
        0 => Err(ApiError::not_found("user not found").into()),
        13 => Err(anyhow::anyhow!("database offline").into()),
        id if traced => Ok(User { id: id * 10 }),
        id => Ok(User { id }),
    })
}

fn user_ctx(method: Method, id: &str) -> ExtractionContext {
    ExtractionContextBuilder::new()
        .method(method)
        .path_param("id", id)
        .build()
}

#[tokio::test]
async fn test_handler_errors() {
    let mut api = Api::new();
    let endpoint = api.get("/users/{id}").handler(load_user).unwrap();

    let response = endpoint.call(user_ctx(Method::GET, "0")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(&response), json!({"message": "user not found"}));

    let response = endpoint.call(user_ctx(Method::GET, "13")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&response), json!({"message": "internal server error"}));

    let response = endpoint.call(user_ctx(Method::GET, "x")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_handler_reads_context() {
    let mut api = Api::new();
    let endpoint = api.get("/users/{id}").handler(load_user).unwrap();

    let ctx = ExtractionContextBuilder::new()
        .path_param("id", "4")
        .header("X-Trace", "1")
        .build();
    assert_eq!(body_json(&endpoint.call(ctx).await), json!({"id": 40}));
}

#[tokio::test]
async fn test_head_has_no_body() {
    let mut api = Api::new();
    let endpoint = api.head("/users/{id}").handler(load_user).unwrap();

    let response = endpoint.call(user_ctx(Method::HEAD, "4")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().is_empty());
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );

    let response = endpoint.call(user_ctx(Method::HEAD, "0")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_endpoints_serve_concurrently() {
    let endpoint = search_endpoint();
    let handles: Vec<_> = (1..=8)
        .map(|page| {
            let endpoint = Arc::clone(&endpoint);
            tokio::spawn(async move {
                let uri: Uri = format!("/search?q=x&page={page}").parse().unwrap();
                let ctx = ExtractionContextBuilder::new().uri(uri).build();
                let response = endpoint.call(ctx).await;
                body_json(&response)["input"]["page"].as_i64().unwrap()
            })
        })
        .collect();

    for (expected, handle) in (1..=8).zip(handles) {
        assert_eq!(handle.await.unwrap(), expected);
    }
}
