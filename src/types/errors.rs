//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Each variant maps onto one HTTP status,
//! so handlers can return `Result<_, Error>` and rely on `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the service.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or empty input (map to 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown route or resource (map to 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Worker pool closed or saturated, agent runtime unreachable (map to 503).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Wall-clock limit exceeded (map to 504).
    #[error("timeout: {0}")]
    Timeout(String),

    /// The SDK failed outside of a run, e.g. while listing tools (map to 500).
    #[error("{0}")]
    Upstream(String),

    /// Invalid or incomplete settings. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (map to 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Upstream(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Serialization(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error means the service itself is degraded.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// Lets handlers return `Result<_, Error>` directly.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
        }

        let detail = match &self {
            Error::Upstream(msg) => msg.clone(),
            Error::Internal(msg) => format!("Internal server error: {msg}"),
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
