pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::assist::handlers as assist;
use crate::interview::handlers as chat;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume parsing and free-text generation
        .route("/api/v1/resume/parse", post(ai::handle_parse_resume))
        .route("/api/v1/ai/generate", post(ai::handle_generate_text))
        // Writing assistant
        .route("/api/v1/assist/summary", post(assist::handle_summary))
        .route(
            "/api/v1/assist/experience-bullets",
            post(assist::handle_experience_bullets),
        )
        .route(
            "/api/v1/assist/project-bullets",
            post(assist::handle_project_bullets),
        )
        .route("/api/v1/assist/skills", post(assist::handle_skills))
        // Chat sessions / interview
        .route("/api/v1/chat/sessions", post(chat::handle_start_chat))
        .route(
            "/api/v1/chat/sessions/:id",
            delete(chat::handle_end_chat),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(chat::handle_send_message),
        )
        .route(
            "/api/v1/chat/sessions/:id/finish",
            post(chat::handle_finish_chat),
        )
        // Runtime API key
        .route(
            "/api/v1/credentials",
            get(ai::handle_credential_status)
                .put(ai::handle_set_credential)
                .delete(ai::handle_clear_credential),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::ai::service::ChatHistory;
    use crate::interview::sessions::SessionStore;
    use crate::ai::{AiError, AiService, ChatMessage, ChatSession, CredentialStore, FilePart, ProviderKind};
    use crate::models::resume::ParsedResume;

    /// Answers from the credential store: no key means `InvalidApiKey`.
    struct StubAi {
        credentials: CredentialStore,
    }

    impl StubAi {
        fn check(&self) -> Result<(), AiError> {
            self.credentials.get().map(|_| ()).ok_or(AiError::InvalidApiKey)
        }
    }

    #[async_trait]
    impl AiService for StubAi {
        fn provider(&self) -> ProviderKind {
            ProviderKind::OpenRouter
        }

        async fn parse_resume(&self, file: &FilePart) -> Result<ParsedResume, AiError> {
            self.check()?;
            if file.mime_type == "image/png" {
                return Err(AiError::RateLimit);
            }
            Ok(ParsedResume::default())
        }

        async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
            self.check()?;
            Ok(format!("- {prompt}\n- second"))
        }

        fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatSession> {
            Box::new(EchoChat(ChatHistory::with_system(system_instruction)))
        }
    }

    struct EchoChat(ChatHistory);

    #[async_trait]
    impl ChatSession for EchoChat {
        async fn send_message(&mut self, text: &str) -> Result<String, AiError> {
            let reply = if text.contains("JSON") {
                "```json\n{\"personalInfo\":{\"fullName\":\"Alex Doe\"}}\n```".to_string()
            } else {
                format!("echo: {text}")
            };
            self.0.record_turn(text, &reply);
            Ok(reply)
        }

        fn history(&self) -> &[ChatMessage] {
            self.0.messages()
        }
    }

    fn state(key: Option<&str>) -> AppState {
        let credentials = CredentialStore::new(key.map(String::from));
        let ai = Arc::new(StubAi {
            credentials: credentials.clone(),
        });
        AppState::new(ai, credentials, SessionStore::new())
    }

    fn app(key: Option<&str>) -> Router {
        build_router(state(key))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "openrouter");
    }

    #[tokio::test]
    async fn test_generate_without_key_is_unauthorized() {
        let response = app(None)
            .oneshot(json_request("POST", "/api/v1/ai/generate", json!({"prompt": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_API_KEY");
    }

    #[tokio::test]
    async fn test_blank_prompt_is_bad_request() {
        let response = app(Some("k"))
            .oneshot(json_request("POST", "/api/v1/ai/generate", json!({"prompt": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_credentials_round_trip() {
        let app = app(None);

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/v1/credentials", json!({"apiKey": "sk-1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/credentials").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"provider": "openrouter", "configured": true})
        );

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/ai/generate", json!({"prompt": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "- hi\n- second");
    }

    #[tokio::test]
    async fn test_experience_bullets() {
        let response = app(Some("k"))
            .oneshot(json_request(
                "POST",
                "/api/v1/assist/experience-bullets",
                json!({"jobTitle": "Dev", "company": "Acme"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["bullets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parse_resume_multipart() {
        let boundary = "XBOUNDARY";
        let upload = |mime: &str| {
            let body = format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv\"\r\nContent-Type: {mime}\r\n\r\nhello\r\n--{boundary}--\r\n"
            );
            Request::post("/api/v1/resume/parse")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap()
        };
        let app = app(Some("k"));

        let response = app.clone().oneshot(upload("text/plain")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["skills"], json!([]));

        let response = app.oneshot(upload("image/png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_chat_session_lifecycle() {
        let app = app(Some("k"));

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/chat/sessions", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let id = body["sessionId"].as_str().unwrap().to_string();
        assert!(!body["greeting"].as_str().unwrap().is_empty());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/chat/sessions/{id}/messages"),
                json!({"text": "I am a developer"}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["reply"], "echo: I am a developer");

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/chat/sessions/{id}/finish"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["personalInfo"]["fullName"], "Alex Doe");

        let delete = || {
            Request::delete(format!("/api/v1/chat/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app.oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let id = uuid::Uuid::new_v4();
        let response = app(Some("k"))
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/chat/sessions/{id}/messages"),
                json!({"text": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_turn_in_flight_is_conflict() {
        let state = state(Some("k"));
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/chat/sessions", json!({})))
            .await
            .unwrap();
        let body = body_json(response).await;
        let id: uuid::Uuid = body["sessionId"].as_str().unwrap().parse().unwrap();

        let session = state.sessions.get(id).await.unwrap();
        let guard = session.lock().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/chat/sessions/{id}/messages"),
                json!({"text": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "SESSION_BUSY");

        let finish = || {
            Request::post(format!("/api/v1/chat/sessions/{id}/finish"))
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(finish()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        drop(guard);
        let response = app.oneshot(finish()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(session.lock().await.history().len(), 3);
    }
}
