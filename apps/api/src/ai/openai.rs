//! OpenAI-compatible chat-completions adapter (OpenRouter by default).
//!
//! The transport has no schema parameter and no document input: the JSON
//! schema is inlined into the system prompt, and the uploaded file travels as a
//! `data:` image URL (or as extracted text for text and PDF uploads).
//!
//! Classification is by HTTP status:
//! - 401 → `InvalidApiKey`, and the stored credential is cleared
//! - 429 → `RateLimit`
//! - other non-2xx → `Generic` with the upstream `error.message` when present

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::credentials::CredentialStore;
use crate::ai::errors::AiError;
use crate::ai::prompts::{parse_system_with_schema, PARSE_IMAGE_INSTRUCTION, PARSE_TEXT_INSTRUCTION};
use crate::ai::response::decode_resume;
use crate::ai::service::{
    AiService, ChatHistory, ChatMessage, ChatRole, ChatSession, FilePart, ProviderKind,
};
use crate::config::OpenRouterSettings;
use crate::models::resume::ParsedResume;

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct ImageUrl {
    url: String,
}

impl WireMessage {
    fn text(role: &'static str, text: impl Into<String>) -> Self {
        Self {
            role,
            content: WireContent::Text(text.into()),
        }
    }

    fn from_chat(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
        };
        Self::text(role, message.text.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct ChatCompletionsTransport {
    client: Client,
    settings: OpenRouterSettings,
    credentials: CredentialStore,
}

impl ChatCompletionsTransport {
    /// POSTs to `/chat/completions` and returns `choices[0].message.content`
    /// (`None` when the model returned null content).
    async fn complete(
        &self,
        messages: &[WireMessage],
        json_mode: bool,
    ) -> Result<Option<String>, AiError> {
        let api_key = self.credentials.get().ok_or(AiError::InvalidApiKey)?;
        let body = ChatCompletionRequest {
            model: &self.settings.model,
            messages,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.settings.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.app_url)
            .header("X-Title", &self.settings.app_title)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Chat completion request failed: {e}");
                AiError::generic("Unable to reach the AI service. Please check your connection.")
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.classify_status(status, response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Chat completion response was not decodable: {e}");
            AiError::Generic(None)
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            warn!("Chat completion response contained no choices");
            AiError::Generic(None)
        })?;

        debug!("Chat completion succeeded (model: {})", self.settings.model);
        Ok(choice.message.content)
    }

    async fn classify_status(&self, status: StatusCode, response: reqwest::Response) -> AiError {
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Upstream rejected the API key; clearing stored credential");
                self.credentials.clear();
                AiError::InvalidApiKey
            }
            StatusCode::TOO_MANY_REQUESTS => AiError::RateLimit,
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!("Chat completion returned {status}: {body}");
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .ok()
                    .and_then(|e| e.error.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| {
                        format!("API request failed with status {}.", status.as_u16())
                    });
                AiError::Generic(Some(message))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct OpenRouterService {
    transport: ChatCompletionsTransport,
}

impl OpenRouterService {
    pub fn new(client: Client, settings: &OpenRouterSettings, credentials: CredentialStore) -> Self {
        Self {
            transport: ChatCompletionsTransport {
                client,
                settings: settings.clone(),
                credentials,
            },
        }
    }

    /// Text uploads are sent as text; everything else as an image reference.
    async fn file_parts(file: &FilePart) -> Vec<ContentPart> {
        if !file.is_image() {
            if let Some(text) = file.extract_text().await {
                return vec![ContentPart::Text {
                    text: format!("{PARSE_TEXT_INSTRUCTION}\n\nRESUME:\n{text}"),
                }];
            }
        }
        vec![
            ContentPart::Text {
                text: PARSE_IMAGE_INSTRUCTION.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: file.data_url(),
                },
            },
        ]
    }
}

#[async_trait]
impl AiService for OpenRouterService {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    async fn parse_resume(&self, file: &FilePart) -> Result<ParsedResume, AiError> {
        let messages = vec![
            WireMessage::text("system", parse_system_with_schema()),
            WireMessage {
                role: "user",
                content: WireContent::Parts(Self::file_parts(file).await),
            },
        ];

        let content = self.transport.complete(&messages, true).await?;
        decode_resume(content.as_deref().unwrap_or("{}"), None)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
        let messages = [WireMessage::text("user", prompt)];
        Ok(self
            .transport
            .complete(&messages, false)
            .await?
            .unwrap_or_default())
    }

    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatSession> {
        Box::new(OpenRouterChatSession {
            transport: self.transport.clone(),
            history: ChatHistory::with_system(system_instruction),
        })
    }
}

/// `system` / `user` / `assistant` history, replayed on every call.
pub struct OpenRouterChatSession {
    transport: ChatCompletionsTransport,
    history: ChatHistory,
}

#[async_trait]
impl ChatSession for OpenRouterChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String, AiError> {
        let messages: Vec<WireMessage> = self
            .history
            .with_user_turn(text)
            .iter()
            .map(WireMessage::from_chat)
            .collect();

        let reply = self
            .transport
            .complete(&messages, false)
            .await?
            .unwrap_or_default();
        self.history.record_turn(text, &reply);
        Ok(reply)
    }

    fn history(&self) -> &[ChatMessage] {
        self.history.messages()
    }
}
