//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use domopush_api::router::build_app_router;
use domopush_api::state::AppState;
use domopush_core::{DecoratorSpec, GcmConfig, Rule};
use domopush_db::SqliteRegistry;
use domopush_engine::EventBus;

/// Rules used by the integration tests, built in code so the tests do not
/// depend on fixture files: one GCM-backed rule and one with no provider.
pub fn test_rules() -> Vec<Arc<Rule>> {
    vec![
        Arc::new(Rule {
            id: "alarm".to_string(),
            filters: Vec::new(),
            decorators: vec![DecoratorSpec::Timestamp],
            gcm: Some(GcmConfig {
                api_key: "test-api-key".to_string(),
                restricted_package_name: None,
                rate_limit_ms: None,
            }),
            wns: None,
        }),
        Arc::new(Rule {
            id: "heating".to_string(),
            filters: Vec::new(),
            decorators: Vec::new(),
            gcm: None,
            wns: None,
        }),
    ]
}

/// Build the shared application state over the given database pool.
///
/// Returned separately from the router so tests that need a handle on the
/// event bus (e.g. ingestion tests) can subscribe before building the app.
pub fn test_state(pool: SqlitePool) -> AppState {
    AppState {
        pool: pool.clone(),
        registry: Arc::new(SqliteRegistry::new(pool)),
        rules: Arc::new(test_rules()),
        bus: Arc::new(EventBus::default()),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This goes through [`build_app_router`], the same constructor `main.rs`
/// uses, so integration tests exercise the production middleware stack
/// (request ID, timeout, tracing, panic recovery).
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_app_router(test_state(pool), 30)
}

/// Send a GET request to the app and return the response.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and an explicit `User-Agent`.
pub async fn post_json_with_agent(
    app: Router,
    uri: &str,
    agent: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, agent)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// Assert a response is an error with the given status and error code.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
}
