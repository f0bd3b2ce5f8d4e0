//! Axum route handlers for resume parsing, free-text generation, and the
//! runtime API key.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai::FilePart;
use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateTextResponse {
    pub text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCredentialRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub provider: &'static str,
    pub configured: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/parse
///
/// Multipart upload with a single `file` field. The part's content type is
/// forwarded to the provider as the MIME type.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedResume>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        info!("Parsing resume upload '{file_name}' ({mime_type}, {} bytes)", bytes.len());
        let file = FilePart::from_bytes(mime_type, &bytes);
        let parsed = state.ai.parse_resume(&file).await?;
        return Ok(Json(parsed));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// POST /api/v1/ai/generate
pub async fn handle_generate_text(
    State(state): State<AppState>,
    Json(request): Json<GenerateTextRequest>,
) -> Result<Json<GenerateTextResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    let text = state.ai.generate_text(&request.prompt).await?;
    Ok(Json(GenerateTextResponse { text }))
}

/// GET /api/v1/credentials
pub async fn handle_credential_status(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(CredentialStatus {
        provider: state.ai.provider().as_str(),
        configured: state.credentials.is_configured(),
    })
}

/// PUT /api/v1/credentials
pub async fn handle_set_credential(
    State(state): State<AppState>,
    Json(request): Json<SetCredentialRequest>,
) -> Result<StatusCode, AppError> {
    if request.api_key.trim().is_empty() {
        return Err(AppError::Validation("apiKey cannot be empty".to_string()));
    }
    state.credentials.set(request.api_key);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/credentials
pub async fn handle_clear_credential(State(state): State<AppState>) -> StatusCode {
    state.credentials.clear();
    StatusCode::NO_CONTENT
}
