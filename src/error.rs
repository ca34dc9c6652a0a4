//! Error types for fal-proxy
//!
//! Every failure is rendered into the OpenAI-style error envelope
//! `{ "error": { "message", "type", "code"? } }` before reaching the caller.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing credential; `code` distinguishes the forwarding path
    #[error("{message}")]
    Unauthorized {
        message: String,
        code: Option<&'static str>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Inbound body could not be read, e.g. over the size limit
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    /// A required upstream answered with a non-2xx status
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Local dispatch or transport failure while forwarding
    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("{0}")]
    Parse(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: None,
        }
    }

    pub fn missing_api_key() -> Self {
        Self::Unauthorized {
            message: "Missing API key. Provide 'Authorization: Bearer YOUR_FAL_KEY' header"
                .to_string(),
            code: Some("invalid_api_key"),
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Body(rejection) => rejection.status(),
            AppError::Upstream { status, .. } => *status,
            AppError::Proxy(_)
            | AppError::Parse(_)
            | AppError::Http(_)
            | AppError::Internal(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, code, message) = match &self {
            AppError::Unauthorized { message, code } => {
                ("authentication_error", *code, message.clone())
            }
            AppError::BadRequest(msg) => ("invalid_request", None, msg.clone()),
            AppError::Body(rejection) => ("invalid_request", None, rejection.body_text()),
            AppError::Upstream { message, .. } => ("upstream_error", None, message.clone()),
            AppError::Proxy(_) => ("proxy_error", Some("upstream_error"), self.to_string()),
            AppError::Parse(msg) => ("parse_error", None, msg.clone()),
            AppError::Http(e) => (
                "upstream_error",
                None,
                format!("Upstream request failed: {}", e),
            ),
            AppError::Internal(e) => (
                "proxy_error",
                Some("upstream_error"),
                format!("Proxy error: {}", e),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                message,
                kind,
                code,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
