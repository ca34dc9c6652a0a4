//! fal OpenRouter router client
//!
//! Forwards chat-completions compatible traffic and queries the account
//! balance. Nothing is retried; each failure is reported once.

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::headers::key_authorization,
};

/// JSON error body returned by the billing API
#[derive(Debug, Default, Deserialize)]
struct BillingErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

impl BillingErrorBody {
    fn message(&self) -> Option<&str> {
        [&self.detail, &self.message]
            .into_iter()
            .filter_map(|field| field.as_ref().and_then(Value::as_str))
            .find(|msg| !msg.is_empty())
    }
}

/// fal upstream client
#[derive(Debug, Clone)]
pub struct FalClient {
    client: reqwest::Client,
    base_url: String,
    balance_url: String,
}

impl FalClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.fal_base_url.trim_end_matches('/').to_string(),
            balance_url: config.fal_balance_url.clone(),
        }
    }

    /// Forward a request to `{base_url}{path_and_query}`.
    ///
    /// Transport failures become [`AppError::Proxy`]; upstream statuses,
    /// including errors, are left for the caller to relay.
    #[instrument(skip(self, headers, body), fields(method = %method, path = %path_and_query))]
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path_and_query);

        debug!(
            url = %url,
            body_len = body.as_ref().map_or(0, Bytes::len),
            "Sending request to fal"
        );

        let mut request_builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request_builder = request_builder.body(body);
        }

        request_builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to reach fal");
            AppError::Proxy(e.to_string())
        })
    }

    /// Fetch the raw plain-text balance for `api_key`
    #[instrument(skip_all)]
    pub async fn fetch_balance(&self, api_key: &str) -> AppResult<String> {
        let response = self
            .client
            .get(&self.balance_url)
            .header(header::AUTHORIZATION, key_authorization(api_key)?)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach fal billing");
                AppError::Upstream {
                    status: StatusCode::BAD_GATEWAY,
                    message: format!("Failed to fetch balance: {}", e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let fallback = format!("Failed to fetch balance: {}", status.as_u16());
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BillingErrorBody>(&text)
                .ok()
                .and_then(|body| body.message().map(str::to_string))
                .unwrap_or(fallback);

            return Err(AppError::Upstream { status, message });
        }

        response.text().await.map_err(|e| AppError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            message: format!("Failed to fetch balance: {}", e),
        })
    }
}
