//! Service description served at `/`

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;

use crate::{transform::ImageDefaults, AppState};

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub usage: Usage,
    pub endpoints: Vec<&'static str>,
    pub features: Vec<&'static str>,
    pub thinking_models: BTreeMap<String, String>,
    pub image_config: ImageConfigPolicy,
    pub docs: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Usage {
    pub base_url: String,
    pub api_key: &'static str,
    pub example: String,
}

#[derive(Debug, Serialize)]
pub struct ImageConfigPolicy {
    pub enabled_models: Vec<String>,
    pub defaults: ImageDefaults,
    pub prompt_keywords: PromptKeywords,
    pub priority: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PromptKeywords {
    pub resolution: Vec<&'static str>,
    pub aspect_ratio: Vec<&'static str>,
}

/// Origin the client used to reach us, honouring a fronting proxy's scheme
fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

pub async fn service_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ServiceInfo> {
    let base_url = format!("{}/v1", request_origin(&headers));
    let tables = &state.tables;

    Json(ServiceInfo {
        service: "fal OpenRouter Proxy",
        version: env!("CARGO_PKG_VERSION"),
        usage: Usage {
            example: format!(
                "client = OpenAI(base_url='{}', api_key='your-fal-key')",
                base_url
            ),
            base_url,
            api_key: "your-fal-api-key",
        },
        endpoints: vec![
            "/v1/chat/completions",
            "/v1/embeddings",
            "/v1/models",
            "/v1/responses",
            "/v1/dashboard/billing/subscription",
            "/v1/dashboard/billing/credit_grants",
            "/v1/dashboard/billing/usage",
        ],
        features: vec![
            "Thinking model routing (xxx-thinking -> xxx + reasoning.enabled, case-insensitive)",
            "Automatic modalities for image generation models",
            "Smart image_config for allow-listed models: 4K 1:1 by default, overridable from the prompt",
            "Image responses rewritten to Markdown (first image only)",
            "Model list merged with the image model catalog",
            "Streaming responses relayed without time limits",
        ],
        thinking_models: tables.thinking_aliases.clone(),
        image_config: ImageConfigPolicy {
            enabled_models: tables.smart_config_models.clone(),
            defaults: tables.image_defaults,
            prompt_keywords: PromptKeywords {
                resolution: vec!["1K", "2K", "4K"],
                aspect_ratio: vec![
                    "16:9", "9:16", "1:1", "4:3", "3:4", "3:2", "2:3", "landscape", "portrait",
                    "square", "横屏", "竖屏", "方形",
                ],
            },
            priority: "prompt > request parameters > defaults",
        },
        docs: "https://fal.ai/models/openrouter/router",
    })
}
