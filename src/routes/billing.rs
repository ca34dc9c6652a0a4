//! OpenAI dashboard billing endpoints
//!
//! `/v1/dashboard/billing/{subscription,credit_grants,usage}` backed by the
//! fal balance.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::{
    billing::{parse_balance, render_balance, BalanceFormat, BillingResponse},
    error::{AppError, AppResult},
    proxy::headers::extract_api_key,
    AppState,
};

pub async fn billing(
    State(state): State<Arc<AppState>>,
    Path(format_key): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<BillingResponse>> {
    let api_key = extract_api_key(&headers, state.config.fal_key.as_deref())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

    let format = BalanceFormat::from_key(&format_key);
    let text = state.fal.fetch_balance(&api_key).await?;
    let balance = parse_balance(&text)?;

    info!(format = ?format, "Served billing view");
    Ok(Json(render_balance(balance, format, chrono::Utc::now())))
}
