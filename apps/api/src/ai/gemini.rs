//! Gemini adapter: managed `generateContent` transport with native
//! structured-output schema enforcement and inline file parts.
//!
//! Gemini reports failures only as free-text messages, so classification is a
//! substring table over the message (see `CLASSIFICATION_TABLE`). It is
//! best-effort and only as good as the known phrasings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::credentials::CredentialStore;
use crate::ai::errors::AiError;
use crate::ai::prompts::{PARSE_INSTRUCTION, PARSE_SYSTEM};
use crate::ai::response::decode_resume;
use crate::ai::schema::resume_schema;
use crate::ai::service::{
    AiService, ChatHistory, ChatMessage, ChatRole, ChatSession, FilePart, ProviderKind,
};
use crate::config::GeminiSettings;
use crate::models::resume::ParsedResume;

/// Display message for failed service calls (parse / generate).
pub const GEMINI_FAILURE_MESSAGE: &str = "The AI failed to process the request. \
    The format might be unsupported or an unknown error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorClass {
    RateLimit,
    InvalidApiKey,
}

/// Lower-case substring → error kind. First match wins.
const CLASSIFICATION_TABLE: &[(&str, ErrorClass)] = &[
    ("rate limit", ErrorClass::RateLimit),
    ("quota", ErrorClass::RateLimit),
    ("api key not valid", ErrorClass::InvalidApiKey),
];

/// Maps an upstream error message to an error kind, or `generic` if no pattern matches.
pub fn classify_message(message: &str, generic: AiError) -> AiError {
    let lower = message.to_lowercase();
    CLASSIFICATION_TABLE
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, class)| match class {
            ErrorClass::RateLimit => AiError::RateLimit,
            ErrorClass::InvalidApiKey => AiError::InvalidApiKey,
        })
        .unwrap_or(generic)
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, like the SDK's `response.text`.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!texts.is_empty()).then(|| texts.concat())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Why a transport call failed, before classification.
#[derive(Debug)]
enum CallFailure {
    MissingKey,
    Upstream(String),
}

impl CallFailure {
    fn classify(self, generic: AiError) -> AiError {
        match self {
            CallFailure::MissingKey => AiError::InvalidApiKey,
            CallFailure::Upstream(message) => {
                warn!("Gemini request failed: {message}");
                classify_message(&message, generic)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct GeminiTransport {
    client: Client,
    base_url: String,
    model: String,
    credentials: CredentialStore,
}

impl GeminiTransport {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<String, CallFailure> {
        let api_key = self.credentials.get().ok_or(CallFailure::MissingKey)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CallFailure::Upstream(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CallFailure::Upstream(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("status {status}: {body}"));
            return Err(CallFailure::Upstream(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| CallFailure::Upstream(format!("undecodable response: {e}")))?;

        debug!("Gemini call succeeded (model: {})", self.model);

        parsed
            .text()
            .ok_or_else(|| CallFailure::Upstream("response contained no text".to_string()))
    }
}

fn text_content<'a>(role: Option<&'static str>, text: &'a str) -> Content<'a> {
    Content {
        role,
        parts: vec![Part::Text { text }],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct GeminiService {
    transport: GeminiTransport,
}

impl GeminiService {
    pub fn new(client: Client, settings: &GeminiSettings, credentials: CredentialStore) -> Self {
        Self {
            transport: GeminiTransport {
                client,
                base_url: settings.base_url.clone(),
                model: settings.model.clone(),
                credentials,
            },
        }
    }
}

#[async_trait]
impl AiService for GeminiService {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn parse_resume(&self, file: &FilePart) -> Result<ParsedResume, AiError> {
        let generic = || AiError::generic(GEMINI_FAILURE_MESSAGE);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &file.mime_type,
                            data: &file.data,
                        },
                    },
                    Part::Text {
                        text: PARSE_INSTRUCTION,
                    },
                ],
            }],
            system_instruction: Some(text_content(None, PARSE_SYSTEM)),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: resume_schema().to_gemini_schema(),
            }),
        };

        let text = self
            .transport
            .generate_content(&request)
            .await
            .map_err(|f| f.classify(generic()))?;

        decode_resume(&text, Some(GEMINI_FAILURE_MESSAGE))
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateContentRequest {
            contents: vec![text_content(Some("user"), prompt)],
            system_instruction: None,
            generation_config: None,
        };

        self.transport
            .generate_content(&request)
            .await
            .map_err(|f| f.classify(AiError::generic(GEMINI_FAILURE_MESSAGE)))
    }

    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatSession> {
        Box::new(GeminiChatSession {
            transport: self.transport.clone(),
            system_instruction: system_instruction.to_string(),
            history: ChatHistory::new(),
        })
    }
}

/// Client-side history of `user` / `model` turns, replayed on every call.
/// A turn is recorded only after its reply arrives.
pub struct GeminiChatSession {
    transport: GeminiTransport,
    system_instruction: String,
    history: ChatHistory,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String, AiError> {
        let outgoing = self.history.with_user_turn(text);
        let contents: Vec<Content<'_>> = outgoing
            .iter()
            .filter_map(|m| match m.role {
                ChatRole::User => Some(text_content(Some("user"), &m.text)),
                ChatRole::Model => Some(text_content(Some("model"), &m.text)),
                ChatRole::System => None,
            })
            .collect();
        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(text_content(None, &self.system_instruction)),
            generation_config: None,
        };

        let reply = self
            .transport
            .generate_content(&request)
            .await
            .map_err(|failure| failure.classify(AiError::Generic(None)))?;
        self.history.record_turn(text, &reply);
        Ok(reply)
    }

    fn history(&self) -> &[ChatMessage] {
        self.history.messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn service(base_url: String, key: Option<&str>) -> GeminiService {
        let settings = GeminiSettings {
            api_key: None,
            base_url,
            model: MODEL.to_string(),
        };
        GeminiService::new(
            Client::new(),
            &settings,
            CredentialStore::new(key.map(String::from)),
        )
    }

    fn text_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    fn error_reply(code: u16, message: &str) -> ResponseTemplate {
        ResponseTemplate::new(code).set_body_json(serde_json::json!({
            "error": { "code": code, "message": message, "status": "ERROR" }
        }))
    }

    fn generate_path() -> String {
        format!("/models/{MODEL}:generateContent")
    }

    #[test]
    fn test_classification_table() {
        let generic = AiError::Generic(None);
        assert_eq!(
            classify_message("Rate limit exceeded for model", generic.clone()),
            AiError::RateLimit
        );
        assert_eq!(
            classify_message("Resource has been exhausted (e.g. check quota).", generic.clone()),
            AiError::RateLimit
        );
        assert_eq!(
            classify_message("API key not valid. Please pass a valid API key.", generic.clone()),
            AiError::InvalidApiKey
        );
        assert_eq!(
            classify_message("Internal error encountered.", generic.clone()),
            generic
        );
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hel" }, { "text": "lo" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello"));

        let empty: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_parts_serialize_in_gemini_shape() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "application/pdf",
                data: "AAAA",
            },
        };
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            serde_json::json!({ "inlineData": { "mimeType": "application/pdf", "data": "AAAA" } })
        );
    }

    #[tokio::test]
    async fn test_parse_resume_sends_schema_and_file() {
        let mock_server = MockServer::start().await;
        let upstream = r#"{"personalInfo":{"fullName":"Alex Doe","jobTitle":"Engineer"},"summary":"...","experience":[{"jobTitle":"Dev","company":"Acme","location":"NYC","startDate":"2020","endDate":"2022","description":["Did X"]}],"education":[],"skills":[{"name":"Go"}],"projects":[],"certifications":[],"languages":[]}"#;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_string_contains("responseSchema"))
            .and(body_string_contains("inlineData"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(upstream)))
            .mount(&mock_server)
            .await;

        let svc = service(mock_server.uri(), Some("g-key"));
        let file = FilePart::from_bytes("application/pdf", b"%PDF-1.4");
        let parsed = svc.parse_resume(&file).await.unwrap();

        assert_eq!(parsed.personal_info.unwrap().full_name, "Alex Doe");
        assert_eq!(parsed.experience.len(), 1);
        assert!(!parsed.experience[0].id.is_empty());
        assert_eq!(parsed.skills[0].name, "Go");
        assert!(!parsed.skills[0].id.is_empty());
        assert!(parsed.education.is_empty());
        assert!(parsed.projects.is_empty());
        assert!(parsed.certifications.is_empty());
        assert!(parsed.languages.is_empty());

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "application/pdf");
    }

    #[tokio::test]
    async fn test_parse_resume_omitted_projects_become_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_reply(r#"{"summary":"Hi","skills":[]}"#)),
            )
            .mount(&mock_server)
            .await;

        let parsed = service(mock_server.uri(), Some("g-key"))
            .parse_resume(&FilePart::from_bytes("text/plain", b"resume"))
            .await
            .unwrap();
        assert!(parsed.projects.is_empty());
        assert!(parsed.experience.is_empty());
    }

    #[tokio::test]
    async fn test_parse_resume_malformed_json_is_generic() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("not json")))
            .mount(&mock_server)
            .await;

        let err = service(mock_server.uri(), Some("g-key"))
            .parse_resume(&FilePart::from_bytes("text/plain", b"resume"))
            .await
            .unwrap_err();
        assert_eq!(err, AiError::generic(GEMINI_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_upstream_errors_are_classified() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("quota please"))
            .respond_with(error_reply(429, "Resource has been exhausted (e.g. check quota)."))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("bad key please"))
            .respond_with(error_reply(400, "API key not valid. Please pass a valid API key."))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("boom please"))
            .respond_with(error_reply(500, "Internal error encountered."))
            .mount(&mock_server)
            .await;

        let svc = service(mock_server.uri(), Some("g-key"));
        assert_eq!(svc.generate_text("quota please").await, Err(AiError::RateLimit));
        assert_eq!(svc.generate_text("bad key please").await, Err(AiError::InvalidApiKey));
        assert_eq!(
            svc.generate_text("boom please").await,
            Err(AiError::generic(GEMINI_FAILURE_MESSAGE))
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let mock_server = MockServer::start().await;
        let svc = service(mock_server.uri(), None);

        assert_eq!(svc.generate_text("hello").await, Err(AiError::InvalidApiKey));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_chat_is_lazy() {
        let mock_server = MockServer::start().await;
        let svc = service(mock_server.uri(), Some("g-key"));

        let chat = svc.start_chat("Be helpful");
        assert!(chat.history().is_empty());
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_history_survives_failed_turn() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("explode"))
            .respond_with(error_reply(500, "Internal error encountered."))
            .with_priority(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Nice to meet you")))
            .mount(&mock_server)
            .await;

        let svc = service(mock_server.uri(), Some("g-key"));
        let mut chat = svc.start_chat("Interview the user");

        assert_eq!(chat.send_message("I am Alex").await.unwrap(), "Nice to meet you");
        let before = chat.history().to_vec();

        let err = chat.send_message("explode").await.unwrap_err();
        assert_eq!(err, AiError::Generic(None));
        assert_eq!(chat.history(), before.as_slice());

        chat.send_message("I am an engineer").await.unwrap();
        let requests = mock_server.received_requests().await.unwrap();
        let last: serde_json::Value = requests.last().unwrap().body_json().unwrap();
        let roles: Vec<_> = last["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(last["contents"][2]["parts"][0]["text"], "I am an engineer");
        assert_eq!(last["systemInstruction"]["parts"][0]["text"], "Interview the user");
        assert!(!last.to_string().contains("explode"));
    }

    #[tokio::test]
    async fn test_dropped_turn_leaves_no_trace() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("slow turn"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_reply("too late"))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .with_priority(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Noted")))
            .mount(&mock_server)
            .await;

        let svc = service(mock_server.uri(), Some("g-key"));
        let mut chat = svc.start_chat("Interview the user");

        let cut_off = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            chat.send_message("slow turn"),
        )
        .await;
        assert!(cut_off.is_err());
        assert!(chat.history().is_empty());

        chat.send_message("next").await.unwrap();
        let requests = mock_server.received_requests().await.unwrap();
        let last: serde_json::Value = requests.last().unwrap().body_json().unwrap();
        let contents = last["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["parts"][0]["text"], "next");
    }
}

