//! Configuration management for fal-proxy
//!
//! Configuration is loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// fal OpenRouter router base URL (chat completions compatible)
    pub fal_base_url: String,
    /// fal billing endpoint returning the plain-text balance
    pub fal_balance_url: String,
    /// Fallback credential for single-tenant deployments
    pub fal_key: Option<String>,

    /// General model catalog
    pub openrouter_models_url: String,
    /// Image-output-only model catalog
    pub openrouter_image_models_url: String,

    /// Extra `virtual -> canonical` thinking aliases layered over the built-in table
    pub thinking_model_mappings: Vec<(String, String)>,

    /// Maximum accepted inbound body size in bytes
    pub max_body_bytes: usize,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("FAL_PROXY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8787".to_string())
                .parse()
                .context("Invalid PORT")?,

            fal_base_url: env::var("FAL_BASE_URL")
                .unwrap_or_else(|_| "https://fal.run/openrouter/router/openai/v1".to_string()),
            fal_balance_url: env::var("FAL_BALANCE_URL")
                .unwrap_or_else(|_| "https://rest.alpha.fal.ai/billing/user_balance".to_string()),
            fal_key: env::var("FAL_KEY").ok().filter(|key| !key.is_empty()),

            openrouter_models_url: env::var("OPENROUTER_MODELS_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1/models".to_string()),
            openrouter_image_models_url: env::var("OPENROUTER_IMAGE_MODELS_URL").unwrap_or_else(
                |_| {
                    "https://openrouter.ai/api/frontend/models/find?output_modalities=image"
                        .to_string()
                },
            ),

            thinking_model_mappings: match env::var("THINKING_MODEL_MAPPINGS") {
                Ok(raw) => parse_mappings(&raw).context("Invalid THINKING_MODEL_MAPPINGS")?,
                Err(_) => Vec::new(),
            },

            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| (64 * 1024 * 1024).to_string())
                .parse()
                .context("Invalid MAX_BODY_BYTES")?,

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }
}

/// Parse `virtual=canonical` pairs separated by commas
fn parse_mappings(raw: &str) -> Result<Vec<(String, String)>> {
    let mut mappings = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((alias, target)) = entry.split_once('=') else {
            bail!("expected `virtual=canonical`, got `{}`", entry);
        };
        let (alias, target) = (alias.trim(), target.trim());
        if alias.is_empty() || target.is_empty() {
            bail!("empty model id in `{}`", entry);
        }
        mappings.push((alias.to_string(), target.to_string()));
    }

    Ok(mappings)
}
