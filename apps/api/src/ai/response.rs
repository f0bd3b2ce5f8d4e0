//! Shared decoding of model replies into normalized resume data.
//!
//! Every adapter converges here: strip optional markdown fences, decode JSON
//! into a `ResumeDraft`, run the normalizer. Malformed output is `Generic`.

use tracing::warn;

use crate::ai::errors::AiError;
use crate::ai::normalize::normalize;
use crate::models::resume::{ParsedResume, ResumeDraft};

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(|s| s.trim())
                .unwrap_or(stripped.trim_end())
        }
        None => text,
    }
}

/// Decodes reply text into a normalized resume.
pub fn decode_resume(text: &str, failure_message: Option<&str>) -> Result<ParsedResume, AiError> {
    let json = strip_json_fences(text);
    match serde_json::from_str::<ResumeDraft>(json) {
        Ok(draft) => Ok(normalize(draft)),
        Err(e) => {
            warn!("Model returned undecodable resume JSON: {e}");
            Err(AiError::Generic(failure_message.map(String::from)))
        }
    }
}
