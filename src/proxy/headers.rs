//! Header policy for upstream proxying
//!
//! Only an explicit allow-list of client headers reaches fal; everything else
//! the client sent is dropped. On the way back only the content type and
//! rate-limit headers are relayed.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, AppResult};

/// Upstream rate-limit headers relayed to the client
pub const RATE_LIMIT_HEADERS: &[&str] = &[
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "x-ratelimit-reset",
];

/// Resolve the caller's fal key.
///
/// `Bearer <key>` and `Key <key>` are accepted. Without either prefix the
/// process-level fallback key is used. A prefix followed by nothing yields
/// no credential.
pub fn extract_api_key(headers: &HeaderMap, fallback: Option<&str>) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let key = match auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("Key "))
    {
        Some(key) => key,
        None => fallback.unwrap_or(""),
    };

    (!key.is_empty()).then(|| key.to_string())
}

/// `Authorization: Key <key>`, the scheme fal expects
pub fn key_authorization(api_key: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!("Key {}", api_key))
        .map_err(|_| AppError::BadRequest("API key contains invalid characters".to_string()))
}

/// Build the outbound header set for a forwarded request
pub fn build_upstream_headers(incoming: &HeaderMap, api_key: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(header::AUTHORIZATION, key_authorization(api_key)?);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        incoming
            .get(header::ACCEPT)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );
    if let Some(user_agent) = incoming.get(header::USER_AGENT) {
        headers.insert(header::USER_AGENT, user_agent.clone());
    }

    Ok(headers)
}

/// Pick the upstream response headers relayed to the client
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();

    if let Some(content_type) = upstream.get(header::CONTENT_TYPE) {
        relayed.insert(header::CONTENT_TYPE, content_type.clone());
    }
    for name in RATE_LIMIT_HEADERS {
        if let Some(value) = upstream.get(*name) {
            relayed.insert(HeaderName::from_static(*name), value.clone());
        }
    }

    relayed
}
