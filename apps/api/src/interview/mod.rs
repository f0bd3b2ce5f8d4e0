//! Resume interview: builds a resume through a guided chat.
//!
//! Flow: `start_interview` (no network) → any number of `send_message` turns →
//! `finish_interview`, which asks for the final JSON and normalizes it.

pub mod handlers;
pub mod prompts;
pub mod sessions;

use tracing::info;

use crate::ai::response::decode_resume;
use crate::ai::{AiError, AiService, ChatSession};
use crate::models::resume::ParsedResume;

pub use self::prompts::{interview_instruction, FINISH_MESSAGE, GREETING};
use self::prompts::FINISH_FAILURE_MESSAGE;

pub fn start_interview(ai: &dyn AiService) -> Box<dyn ChatSession> {
    ai.start_chat(&interview_instruction())
}

/// Requests the collected data as JSON. Tolerates markdown fences; anything
/// that is not a JSON object is `Generic` and the session stays usable.
pub async fn finish_interview(session: &mut dyn ChatSession) -> Result<ParsedResume, AiError> {
    let reply = session.send_message(FINISH_MESSAGE).await?;
    let parsed = decode_resume(&reply, Some(FINISH_FAILURE_MESSAGE))?;
    info!(
        "Interview finished: {} experience, {} education, {} skills",
        parsed.experience.len(),
        parsed.education.len(),
        parsed.skills.len()
    );
    Ok(parsed)
}
