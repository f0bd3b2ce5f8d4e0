use axum::{
    extract::multipart::MultipartError,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;

/// Seconds suggested to clients in `Retry-After` when the provider is rate limiting.
pub const RETRY_AFTER_SECS: &str = "30";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session busy: {0}")]
    Conflict(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = matches!(&self, AppError::Ai(e) if e.is_retryable());
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "SESSION_BUSY", msg.clone()),
            AppError::Ai(e) => {
                tracing::warn!("AI error ({}): {e}", e.kind());
                let (status, code) = match e {
                    AiError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "INVALID_API_KEY"),
                    AiError::RateLimit => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
                    AiError::Generic(_) => (StatusCode::BAD_GATEWAY, "AI_ERROR"),
                };
                (status, code, e.to_string())
            }
            AppError::Upload(e) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", e.body_text()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}
