//! Error types for nregadash
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` and renders the uniform
//! `{ "success": false, "error": ... }` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed client input (400)
    #[error("{0}")]
    Validation(String),

    /// Nothing to work with, e.g. upstream returned no record list (404)
    #[error("{0}")]
    NotFound(String),

    /// Upstream responded with a non-2xx status (500)
    #[error("API error: {status} - {status_text}")]
    UpstreamStatus { status: u16, status_text: String },

    /// Request was sent but no response came back (500)
    #[error("No response from API server. Please try again later.")]
    UpstreamUnavailable,

    /// Any other HTTP client failure, propagated unchanged (500)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Build an upstream status error from a reqwest status code
    pub fn upstream_status(status: reqwest::StatusCode) -> Self {
        AppError::UpstreamStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Metric label for this error
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::UpstreamStatus { .. } => "upstream_status",
            AppError::UpstreamUnavailable => "upstream_unavailable",
            AppError::HttpClient(_) => "http_client",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status_code();
        let error_message = match &self {
            AppError::Database(error) => {
                tracing::error!(%error, "Database failure");
                "Database error".to_string()
            }
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        let body = Json(serde_json::json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_keeps_code_and_reason() {
        let error = AppError::upstream_status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.to_string(), "API error: 503 - Service Unavailable");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            AppError::Validation("District ID required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("No data received from API".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn response_body_has_uniform_shape() {
        let response = AppError::Validation("District ID required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "District ID required");
    }
}
