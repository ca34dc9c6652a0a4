//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    let _ = &*PROMETHEUS_HANDLE;

    metrics::describe_counter!(
        "fal_proxy_requests_total",
        "Total number of requests processed"
    );
    metrics::describe_histogram!(
        "fal_proxy_request_duration_seconds",
        "Request duration in seconds"
    );
    metrics::describe_counter!(
        "fal_proxy_image_catalog_fallbacks_total",
        "Model listings served without the image catalog"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a request
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "fal_proxy_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("fal_proxy_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

pub fn record_image_catalog_fallback() {
    metrics::counter!("fal_proxy_image_catalog_fallbacks_total").increment(1);
}
