//! Service endpoint integration tests
//!
//! Tests for the informational routes and the cross-origin policy:
//! - GET / - service description
//! - GET /health
//! - OPTIONS on any path
//! - CORS headers on success and error responses

use axum::http::{header, Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::TestContext;

fn assert_cors(response: &axum_test::TestResponse) {
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_METHODS),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_HEADERS), "*");
    assert_eq!(response.header(header::ACCESS_CONTROL_MAX_AGE), "86400");
}

#[tokio::test]
async fn test_service_info() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "fal OpenRouter Proxy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["usage"]["base_url"].as_str().unwrap().ends_with("/v1"));
    assert_eq!(
        body["thinking_models"]["deepseek/deepseek-v3.2-thinking"],
        "deepseek/deepseek-v3.2"
    );
    assert_eq!(body["image_config"]["defaults"]["image_size"], "4K");
    assert_eq!(body["image_config"]["defaults"]["aspect_ratio"], "1:1");
    assert_cors(&response);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let response = ctx.server.post("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let ctx = TestContext::new().await;

    for route in ["/v1/chat/completions", "/v1/models", "/health", "/anything/else"] {
        let response = ctx.server.method(Method::OPTIONS, route).await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT, "{}", route);
        assert!(response.as_bytes().is_empty());
        assert_cors(&response);
    }

    assert!(ctx.fal.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_responses_carry_cors() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/v1/chat/completions").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_cors(&response);
}
