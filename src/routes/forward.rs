//! Default forwarding handler
//!
//! Every path without a dedicated route is forwarded to fal with the `/v1`
//! prefix stripped. Request bodies go through the normalizer when they parse;
//! buffered JSON responses go through the image transformer. Event streams
//! are piped through chunk by chunk.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{rejection::BytesRejection, OriginalUri, State},
    http::{header, HeaderMap, Method},
    response::Response,
};
use bytes::Bytes;
use futures::TryStreamExt;
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, AppResult},
    proxy::headers::{build_upstream_headers, extract_api_key, relay_response_headers},
    routes::metrics::record_request,
    transform::{normalize_request, transform_image_response, ModelTables},
    types::{ChatCompletion, ChatRequest},
    AppState,
};

pub async fn forward(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let start_time = Instant::now();

    let api_key = extract_api_key(&headers, state.config.fal_key.as_deref())
        .ok_or_else(AppError::missing_api_key)?;
    let body = body?;

    let path = uri.path();
    let forward_path = path.strip_prefix("/v1").unwrap_or(path);
    let target = match uri.query() {
        Some(query) => format!("{}?{}", forward_path, query),
        None => forward_path.to_string(),
    };

    let upstream_headers = build_upstream_headers(&headers, &api_key)?;

    let body = (method == Method::POST || method == Method::PUT)
        .then(|| prepare_request_body(body, &state.tables));

    info!(method = %method, path = %path, forward_path = %forward_path, "Forwarding request");

    let upstream = state
        .fal
        .forward(method.clone(), &target, upstream_headers, body)
        .await?;
    let status = upstream.status();
    let response = relay_response(upstream).await?;

    let duration = start_time.elapsed().as_secs_f64();
    record_request(forward_path, status.as_u16(), duration);

    info!(
        method = %method,
        path = %path,
        status = %status,
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "Forwarded request completed"
    );

    Ok(response)
}

/// Normalize a chat payload, or hand back the original bytes when the body
/// is not a JSON object. Fields of an unexpected shape inside an object do
/// not prevent normalization.
pub fn prepare_request_body(raw: Bytes, tables: &ModelTables) -> Bytes {
    let request: ChatRequest = match serde_json::from_slice(&raw) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Request body is not a chat payload, forwarding unchanged");
            return raw;
        }
    };

    let normalized = normalize_request(request, tables);
    debug!(model = ?normalized.model(), "Normalized request body");

    match serde_json::to_vec(&normalized) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            warn!(error = %e, "Failed to serialize normalized body, forwarding unchanged");
            raw
        }
    }
}

/// Rewrite image-bearing completions; anything unparseable is returned as-is
pub fn transform_response_body(raw: Bytes) -> Bytes {
    let Ok(completion) = serde_json::from_slice::<ChatCompletion>(&raw) else {
        return raw;
    };

    serde_json::to_vec(&transform_image_response(completion))
        .map(Bytes::from)
        .unwrap_or(raw)
}

/// Convert the upstream response, streaming event streams untouched
async fn relay_response(upstream: reqwest::Response) -> AppResult<Response> {
    let status = upstream.status();
    let headers = relay_response_headers(upstream.headers());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if content_type.contains("text/event-stream") {
        Body::from_stream(
            upstream
                .bytes_stream()
                .inspect_err(|e| warn!(error = %e, "Upstream event stream interrupted")),
        )
    } else {
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| AppError::Proxy(e.to_string()))?;

        if content_type.contains("application/json") {
            Body::from(transform_response_body(bytes))
        } else {
            Body::from(bytes)
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
