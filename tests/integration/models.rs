//! Models endpoint integration tests
//!
//! Tests for `/v1/models` and its `/models` alias:
//! - Merging image-only catalog entries into the general list
//! - Degrading when the image catalog is unavailable
//! - Relaying general catalog failures

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{constants, openrouter_mocks, TestContext};

fn general_catalog() -> Value {
    json!([
        {
            "id": "openai/gpt-4o",
            "name": "GPT-4o",
            "context_length": 128000,
            "architecture": {
                "modality": "text+image->text",
                "input_modalities": ["text", "image"],
                "output_modalities": ["text"]
            }
        },
        {
            "id": "google/gemini-2.5-flash-image",
            "name": "Gemini 2.5 Flash Image",
            "architecture": {
                "input_modalities": ["text", "image"],
                "output_modalities": ["text"]
            }
        }
    ])
}

fn find<'a>(body: &'a Value, id: &str) -> &'a Value {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == id)
        .unwrap_or_else(|| panic!("model {} missing", id))
}

#[tokio::test]
async fn test_models_merges_image_catalog() {
    let ctx = TestContext::new().await;
    openrouter_mocks::mock_models(&ctx.openrouter, general_catalog()).await;
    openrouter_mocks::mock_image_models(
        &ctx.openrouter,
        json!([
            {"slug": "google/gemini-2.5-flash-image", "name": "Gemini 2.5 Flash Image"},
            {
                "slug": "sourceful/riverflow-v2-fast-preview",
                "name": "Riverflow V2 Fast",
                "description": "Fast image model",
                "context_length": 0,
                "output_modalities": ["image"]
            },
            {"slug": "", "name": "nameless"}
        ]),
    )
    .await;

    let response = ctx.server.get("/v1/models").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let gpt = find(&body, "openai/gpt-4o");
    assert_eq!(gpt["architecture"]["output_modalities"], json!(["text"]));

    let backfilled = find(&body, "google/gemini-2.5-flash-image");
    assert_eq!(
        backfilled["architecture"]["output_modalities"],
        json!(["text", "image"])
    );

    let synthesized = find(&body, "sourceful/riverflow-v2-fast-preview");
    assert_eq!(synthesized["name"], "Riverflow V2 Fast");
    assert_eq!(synthesized["context_length"], 4096);
    assert_eq!(
        synthesized["architecture"]["modality"],
        "text+image->text+image"
    );
    assert_eq!(
        synthesized["architecture"]["input_modalities"],
        json!(["text", "image"])
    );
    assert_eq!(synthesized["pricing"]["image"], "0.04");
}

#[tokio::test]
async fn test_models_alias_serves_same_catalog() {
    let ctx = TestContext::new().await;
    openrouter_mocks::mock_models(&ctx.openrouter, general_catalog()).await;
    openrouter_mocks::mock_image_models(&ctx.openrouter, json!([])).await;

    let body: Value = ctx.server.get("/models").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_models_degrades_without_image_catalog() {
    let ctx = TestContext::new().await;
    openrouter_mocks::mock_models(&ctx.openrouter, general_catalog()).await;
    openrouter_mocks::mock_status(&ctx.openrouter, constants::IMAGE_MODELS_PATH, 503).await;

    let response = ctx.server.get("/v1/models").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let untouched = find(&body, "google/gemini-2.5-flash-image");
    assert_eq!(
        untouched["architecture"]["output_modalities"],
        json!(["text"])
    );
}

#[tokio::test]
async fn test_models_relays_general_catalog_failure() {
    let ctx = TestContext::new().await;
    openrouter_mocks::mock_status(&ctx.openrouter, constants::MODELS_PATH, 403).await;
    openrouter_mocks::mock_image_models(&ctx.openrouter, json!([])).await;

    let response = ctx.server.get("/v1/models").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "upstream_error");
    assert_eq!(body["error"]["message"], "Failed to fetch models: 403");
}

#[tokio::test]
async fn test_models_sends_catalog_user_agent() {
    let ctx = TestContext::new().await;
    openrouter_mocks::mock_models(&ctx.openrouter, json!([])).await;
    openrouter_mocks::mock_image_models(&ctx.openrouter, json!([])).await;

    ctx.server.get("/v1/models").await;

    let requests = ctx.openrouter.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests {
        let agent = request.headers.get("user-agent").unwrap().to_str().unwrap();
        assert!(agent.starts_with("fal-openai-proxy/"));
    }
}
