//! AI capability contract. The rest of the application depends on these
//! traits only; provider adapters live in `gemini` and `openai`.

use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::errors::AiError;
use crate::models::resume::ParsedResume;

/// Uploaded file as sent to a provider: MIME type plus base64 payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub mime_type: String,
    pub data: String,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FilePart {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64.encode(bytes))
    }

    /// `data:<mime>;base64,<data>` reference for transports that take image URLs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }

    /// Plain text content for text and PDF uploads. `None` for other types or
    /// when extraction fails. PDF extraction runs on the blocking pool.
    pub async fn extract_text(&self) -> Option<String> {
        let mime = self.mime_type.to_ascii_lowercase();
        let is_text = mime.starts_with("text/") || mime == "application/markdown";
        let is_pdf = mime == "application/pdf";
        if !is_text && !is_pdf {
            return None;
        }

        let bytes = match self.decode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Uploaded file is not valid base64: {e}");
                return None;
            }
        };

        let text = if is_pdf {
            let extracted =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await;
            match extracted {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!("PDF text extraction failed: {e}");
                    return None;
                }
                Err(e) => {
                    warn!("PDF text extraction task failed: {e}");
                    return None;
                }
            }
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };

        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    /// Reply turn. Gemini calls it `model`, chat-completions `assistant`.
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Message history that only ever holds completed turns.
///
/// The outgoing conversation is built with `with_user_turn` and the turn is
/// recorded only once the reply arrives, so a failed or cancelled call leaves
/// nothing behind.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(instruction: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::System, instruction)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The history plus a new user turn, without recording it.
    pub fn with_user_turn(&self, text: &str) -> Vec<ChatMessage> {
        let mut outgoing = Vec::with_capacity(self.messages.len() + 1);
        outgoing.extend_from_slice(&self.messages);
        outgoing.push(ChatMessage::new(ChatRole::User, text));
        outgoing
    }

    /// Appends a completed user/model exchange.
    pub fn record_turn(&mut self, text: &str, reply: &str) {
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.messages.push(ChatMessage::new(ChatRole::Model, reply));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenRouter,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenRouter => "openrouter",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openrouter" | "openai" => Ok(ProviderKind::OpenRouter),
            other => Err(format!("unknown AI provider '{other}'")),
        }
    }
}

/// The provider-agnostic capability set.
///
/// Carried in `AppState` as `Arc<dyn AiService>`.
#[async_trait]
pub trait AiService: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Reconstructs resume data from an uploaded file. Sections absent from the
    /// source come back as empty lists, never invented.
    async fn parse_resume(&self, file: &FilePart) -> Result<ParsedResume, AiError>;

    /// Single free-text completion with no schema constraint.
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError>;

    /// Opens a chat seeded with `system_instruction`. No network I/O happens
    /// until the first `send_message`.
    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatSession>;
}

/// A stateful multi-turn conversation bound to one adapter.
///
/// One call in flight per session; a failed or dropped call leaves the
/// history as it was.
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn send_message(&mut self, text: &str) -> Result<String, AiError>;

    fn history(&self) -> &[ChatMessage];
}
