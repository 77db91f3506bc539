//! Error types for the price-check service.
//!
//! Adapter failures are [`UpstreamError`]s. The pipeline decides whether an
//! upstream failure is fatal for the run ([`AppError`]) or only affects one
//! alert ([`FailureReason`]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single call to an external collaborator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered with a non-2xx status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Credentials for the collaborator are missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// A request URL could not be built from the configured base.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(status: reqwest::StatusCode, body: String) -> Self {
        UpstreamError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

/// Request or run level failure, surfaced to the HTTP caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("alert repository unavailable: {0}")]
    RepositoryUnavailable(#[source] UpstreamError),

    #[error("price provider unavailable: {0}")]
    PriceProviderUnavailable(#[source] UpstreamError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to check price alerts",
                    "message": other.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

/// Why a triggered alert could not be notified. Never fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("no recipient email for alert owner")]
    NoRecipient,

    #[error("email provider is not configured")]
    ProviderUnavailable,

    #[error("email send failed: {0}")]
    SendError(String),
}
