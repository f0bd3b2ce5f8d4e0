//! Provider-independent AI error taxonomy.
//!
//! Every failure surfaced by an `AiService` or `ChatSession` is one of these
//! kinds. Adapters classify transport, status, and decoding failures before
//! returning; raw `reqwest` or `serde_json` errors never cross the contract.

use thiserror::Error;

pub const INVALID_API_KEY_MESSAGE: &str =
    "AI service authentication failed. Please check the API key configuration.";
pub const RATE_LIMIT_MESSAGE: &str =
    "The AI service is currently busy due to high traffic. Please try again in a moment.";
pub const GENERIC_MESSAGE: &str =
    "An unexpected error occurred with the AI service. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// Authentication or authorization failure. Terminal until the credential is replaced.
    #[error("{}", INVALID_API_KEY_MESSAGE)]
    InvalidApiKey,

    /// Quota or throughput exhaustion. The caller may retry later.
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimit,

    /// Anything else, optionally with a message suitable for display.
    #[error("{}", .0.as_deref().unwrap_or(GENERIC_MESSAGE))]
    Generic(Option<String>),
}

impl AiError {
    pub fn generic(message: impl Into<String>) -> Self {
        AiError::Generic(Some(message.into()))
    }

    /// Stable machine-readable code for this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AiError::InvalidApiKey => "invalid_api_key",
            AiError::RateLimit => "rate_limit",
            AiError::Generic(_) => "generic",
        }
    }

    /// Only rate limiting is transient. No retry is performed here.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::RateLimit)
    }
}
