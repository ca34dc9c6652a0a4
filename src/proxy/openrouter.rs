//! OpenRouter model catalog client
//!
//! Two public listings are read: the general `/models` catalog and the
//! frontend image-output catalog. Neither needs a credential.

use axum::http::{header, StatusCode};
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    types::{ImageCatalogEntry, ImageCatalogResponse, ModelList},
};

/// OpenRouter catalog client
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    models_url: String,
    image_models_url: String,
    user_agent: String,
}

impl OpenRouterClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            models_url: config.openrouter_models_url.clone(),
            image_models_url: config.openrouter_image_models_url.clone(),
            user_agent: format!("fal-openai-proxy/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// General catalog. Non-2xx statuses are surfaced as-is.
    #[instrument(skip(self))]
    pub async fn fetch_models(&self) -> AppResult<ModelList> {
        let response = self.get(&self.models_url).await.map_err(models_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                status,
                message: format!("Failed to fetch models: {}", status.as_u16()),
            });
        }

        let list: ModelList = response.json().await.map_err(models_error)?;
        debug!(count = list.data.len(), "Fetched general model catalog");
        Ok(list)
    }

    /// Image-output catalog entries
    #[instrument(skip(self))]
    pub async fn fetch_image_models(&self) -> AppResult<Vec<ImageCatalogEntry>> {
        let response = self
            .get(&self.image_models_url)
            .await?
            .error_for_status()?;

        let body: ImageCatalogResponse = response.json().await?;
        let models = body.data.map(|data| data.models).unwrap_or_default();
        debug!(count = models.len(), "Fetched image model catalog");
        Ok(models)
    }

    async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
    }
}

fn models_error(e: reqwest::Error) -> AppError {
    AppError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message: format!("Failed to fetch models: {}", e),
    }
}
