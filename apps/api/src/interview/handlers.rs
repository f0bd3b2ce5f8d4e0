//! Axum route handlers for chat sessions and the resume interview.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::sessions::SharedSession;
use crate::interview::{finish_interview, start_interview, GREETING};
use crate::models::resume::ParsedResume;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
    /// Custom behaviour. Defaults to the resume interview.
    #[serde(default)]
    pub system_instruction: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatResponse {
    pub session_id: Uuid,
    /// Shown locally as the assistant's first turn; never sent upstream.
    pub greeting: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: String,
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))
}

fn busy(id: Uuid) -> AppError {
    AppError::Conflict(format!("Chat session {id} already has a message in flight"))
}

/// POST /api/v1/chat/sessions
pub async fn handle_start_chat(
    State(state): State<AppState>,
    body: Option<Json<StartChatRequest>>,
) -> Result<(StatusCode, Json<StartChatResponse>), AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = match request.system_instruction.filter(|s| !s.trim().is_empty()) {
        Some(instruction) => state.ai.start_chat(&instruction),
        None => start_interview(state.ai.as_ref()),
    };
    let session_id = state.sessions.insert(session).await;
    info!(
        "Chat session {session_id} started ({} active)",
        state.sessions.len().await
    );

    Ok((
        StatusCode::CREATED,
        Json(StartChatResponse {
            session_id,
            greeting: GREETING,
        }),
    ))
}

/// POST /api/v1/chat/sessions/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let session = lookup(&state, id).await?;
    let mut session = session.try_lock().map_err(|_| busy(id))?;
    let reply = session.send_message(&request.text).await?;
    Ok(Json(SendMessageResponse { reply }))
}

/// POST /api/v1/chat/sessions/:id/finish
pub async fn handle_finish_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParsedResume>, AppError> {
    let session = lookup(&state, id).await?;
    let mut session = session.try_lock().map_err(|_| busy(id))?;
    let parsed = finish_interview(&mut **session).await?;
    Ok(Json(parsed))
}

/// DELETE /api/v1/chat/sessions/:id
pub async fn handle_end_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("Chat session {id} not found")));
    }
    info!("Chat session {id} ended");
    Ok(StatusCode::NO_CONTENT)
}
