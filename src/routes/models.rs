//! Models endpoint
//!
//! Lists the merged OpenRouter catalog, image models included.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    catalog::aggregate_models, error::AppResult, routes::metrics::record_request,
    types::ModelList, AppState,
};

/// List available models
pub async fn list_models(State(state): State<Arc<AppState>>) -> AppResult<Json<ModelList>> {
    let start_time = Instant::now();

    let result = aggregate_models(&state.openrouter).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status().as_u16(),
    };
    record_request("/v1/models", status, start_time.elapsed().as_secs_f64());

    let list = result?;
    info!(count = list.data.len(), "Served model list");
    Ok(Json(list))
}
