//! fal-proxy - OpenAI-compatible reverse proxy for the fal OpenRouter router
//!
//! This library provides the core functionality for the proxy server: request
//! normalization (thinking models, image modalities, smart image config),
//! image response reshaping, model catalog merging and billing adaptation.

pub mod billing;
pub mod catalog;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod transform;
pub mod types;

use std::time::Instant;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::proxy::{FalClient, OpenRouterClient};
pub use crate::transform::ModelTables;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    /// Routing tables, immutable for the process lifetime
    pub tables: ModelTables,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    pub fal: FalClient,
    pub openrouter: OpenRouterClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // No request timeout: streamed completions may run for a long time
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .build()?;

        Ok(Self::with_client(config, http_client))
    }

    /// Create application state around an existing HTTP client
    pub fn with_client(config: Config, http_client: reqwest::Client) -> Self {
        let tables = ModelTables::with_thinking_aliases(config.thinking_model_mappings.clone());
        let fal = FalClient::new(http_client.clone(), &config);
        let openrouter = OpenRouterClient::new(http_client.clone(), &config);

        Self {
            config,
            tables,
            http_client,
            start_time: Instant::now(),
            fal,
            openrouter,
        }
    }
}
