//! Error types for the gateway.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::rate_limit::REMAINING_HEADER;

/// Failure reading or writing the rate-limit store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the command
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded
    #[error("malformed rate limit record: {0}")]
    Malformed(String),
}

/// Failure talking to the upstream language-model API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid authentication secret")]
    Unauthorized,

    #[error("Server authentication is not configured")]
    AuthNotConfigured,

    #[error("{0}")]
    InvalidBody(String),

    #[error("Rate limiter unavailable")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::AuthNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if let GatewayError::RateLimited { retry_after_secs } = self {
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            headers.insert(REMAINING_HEADER, HeaderValue::from_static("0"));
        }

        response
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
