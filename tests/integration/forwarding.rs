//! Forwarding integration tests
//!
//! Tests for the default catch-all route:
//! - Credential resolution and the fal `Key` scheme
//! - Request normalization as seen by fal
//! - Image response reshaping, streaming passthrough and error relay

use axum::http::{header, HeaderValue, StatusCode};
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{bearer, constants, fal_mocks, fal_path, last_fal_body, TestContext};

#[tokio::test]
async fn test_forward_uses_fal_key_scheme() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "openai/gpt-4o", "messages": [{"role": "user", "content": "hi"}]}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "Hello!");

    let requests = ctx.fal.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get(header::AUTHORIZATION).unwrap(),
        &format!("Key {}", constants::TEST_FAL_KEY)
    );
    assert_eq!(
        requests[0].headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_forward_without_key_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": "openai/gpt-4o", "messages": []}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "authentication_error");
    assert_eq!(body["error"]["code"], "invalid_api_key");
    assert!(ctx.fal.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_forward_uses_fallback_key_without_auth_header() {
    let ctx = TestContext::with_config(|config| {
        config.fal_key = Some("server-side-key".to_string());
    })
    .await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let response = ctx
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": "openai/gpt-4o", "messages": []}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let requests = ctx.fal.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get(header::AUTHORIZATION).unwrap(),
        "Key server-side-key"
    );
}

#[tokio::test]
async fn test_thinking_model_is_routed_with_reasoning() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({
            "model": "deepseek/deepseek-v3.2-thinking",
            "messages": [{"role": "user", "content": "why?"}],
            "temperature": 0.2
        }))
        .await;

    let sent = last_fal_body(&ctx.fal).await;
    assert_eq!(sent["model"], "deepseek/deepseek-v3.2");
    assert_eq!(sent["reasoning"], json!({"enabled": true}));
    assert_eq!(sent["temperature"], 0.2);
}

#[tokio::test]
async fn test_configured_thinking_alias_is_honoured() {
    let ctx = TestContext::with_config(|config| {
        config.thinking_model_mappings =
            vec![("acme/deep-think".to_string(), "acme/deep".to_string())];
    })
    .await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "acme/deep-think", "messages": []}))
        .await;

    let sent = last_fal_body(&ctx.fal).await;
    assert_eq!(sent["model"], "acme/deep");
    assert_eq!(sent["reasoning"]["enabled"], true);
}

#[tokio::test]
async fn test_smart_image_config_from_prompt() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({
            "model": "google/gemini-3-pro-image-preview",
            "messages": [{"role": "user", "content": "A 2K wallpaper of a lighthouse, 16:9"}],
            "image_config": {"image_size": "4K", "aspect_ratio": "1:1"}
        }))
        .await;

    let sent = last_fal_body(&ctx.fal).await;
    assert_eq!(sent["modalities"], json!(["image", "text"]));
    assert_eq!(
        sent["image_config"],
        json!({"image_size": "2K", "aspect_ratio": "16:9"})
    );
}

#[tokio::test]
async fn test_image_model_outside_allow_list_only_gets_modalities() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({
            "model": "black-forest-labs/flux.2-pro",
            "messages": [{"role": "user", "content": "a 4K cat"}]
        }))
        .await;

    let sent = last_fal_body(&ctx.fal).await;
    assert_eq!(sent["modalities"], json!(["image", "text"]));
    assert!(sent.get("image_config").is_none());
}

#[tokio::test]
async fn test_invalid_body_is_forwarded_unchanged() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .bytes(Bytes::from_static(b"{\"model\": broken"))
        .await;

    let requests = ctx.fal.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"{\"model\": broken".to_vec());
}

#[tokio::test]
async fn test_image_response_is_rewritten_to_markdown() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_chat_completions(
        &ctx.fal,
        json!({
            "id": "gen-2",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "  Here you go  ",
                    "images": [
                        {"type": "image_url", "image_url": {"url": "https://cdn.fal.media/a.png"}},
                        {"type": "image_url", "image_url": {"url": "https://cdn.fal.media/b.png"}}
                    ]
                },
                "finish_reason": "stop"
            }]
        }),
    )
    .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "google/gemini-2.5-flash-image", "messages": []}))
        .await;

    let body: Value = response.json();
    let message = &body["choices"][0]["message"];
    assert_eq!(
        message["content"],
        "Here you go\n\n![Generated Image](https://cdn.fal.media/a.png)"
    );
    assert!(message.get("images").is_none());
    assert_eq!(body["id"], "gen-2");
}

#[tokio::test]
async fn test_event_stream_is_passed_through() {
    let ctx = TestContext::new().await;
    let stream = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                  data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                  data: [DONE]\n\n";

    Mock::given(method("POST"))
        .and(path(fal_path("/chat/completions")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(stream, "text/event-stream"))
        .mount(&ctx.fal)
        .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "openai/gpt-4o", "messages": [], "stream": true}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response
        .header(header::CONTENT_TYPE)
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(response.text(), stream);
}

#[tokio::test]
async fn test_upstream_error_status_and_rate_limits_are_relayed() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path(fal_path("/chat/completions")))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-internal-trace", "abc")
                .set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .mount(&ctx.fal)
        .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "openai/gpt-4o", "messages": []}))
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("x-ratelimit-remaining"), "0");
    assert!(response.headers().get("x-internal-trace").is_none());
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "slow down");
}

#[tokio::test]
async fn test_get_request_keeps_query_string() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(fal_path("/generation")))
        .and(query_param("id", "gen-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "gen-42"}})))
        .mount(&ctx.fal)
        .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .get("/v1/generation")
        .add_query_param("id", "gen-42")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["id"], "gen-42");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let ctx = TestContext::with_config(|config| {
        config.fal_base_url = "http://127.0.0.1:1".to_string();
    })
    .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({"model": "openai/gpt-4o", "messages": []}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "proxy_error");
}

#[tokio::test]
async fn test_oddly_shaped_fields_still_reach_fal_normalized() {
    let ctx = TestContext::new().await;
    fal_mocks::mock_text_completion(&ctx.fal).await;

    let (name, value) = bearer();
    ctx.server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .json(&json!({
            "model": "deepseek/deepseek-v3.2-thinking",
            "reasoning": true,
            "messages": [{"role": null, "content": "hi"}]
        }))
        .await;

    let sent = last_fal_body(&ctx.fal).await;
    assert_eq!(sent["model"], "deepseek/deepseek-v3.2");
    assert_eq!(sent["reasoning"], json!({"enabled": true}));
    assert_eq!(sent["messages"], json!([{"role": null, "content": "hi"}]));
}

#[tokio::test]
async fn test_oversized_body_gets_error_envelope() {
    let ctx = TestContext::with_config(|config| {
        config.max_body_bytes = 64;
    })
    .await;

    let (name, value) = bearer();
    let response = ctx
        .server
        .post("/v1/chat/completions")
        .add_header(name, value)
        .bytes(Bytes::from(vec![b' '; 1024]))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request");
    assert!(ctx.fal.received_requests().await.unwrap().is_empty());
}

