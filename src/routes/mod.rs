//! HTTP routes for fal-proxy
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod billing;
pub mod forward;
pub mod health;
pub mod info;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::AppState;

/// Answer every OPTIONS request as a CORS preflight
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/", any(info::service_info))
        .route("/health", any(health::health_check))
        .route("/metrics", any(metrics::prometheus_metrics))
        .route("/v1/models", any(models::list_models))
        .route("/models", any(models::list_models))
        .route("/v1/dashboard/billing/:format", any(billing::billing))
        .route("/dashboard/billing/:format", any(billing::billing))
        .fallback(forward::forward)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(preflight))
        // CORS headers are stamped on every response, errors and preflights included
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        ))
        .with_state(state)
}
