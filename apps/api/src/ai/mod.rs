// AI service abstraction layer.
// Callers depend on `AiService` / `ChatSession` only; `build_service` picks the adapter.

pub mod credentials;
pub mod errors;
pub mod gemini;
pub mod handlers;
pub mod normalize;
pub mod openai;
pub mod prompts;
pub mod response;
pub mod schema;
pub mod selector;
pub mod service;

pub use credentials::CredentialStore;
pub use errors::AiError;
pub use normalize::normalize;
pub use selector::build_service;
pub use service::{AiService, ChatMessage, ChatRole, ChatSession, FilePart, ProviderKind};
