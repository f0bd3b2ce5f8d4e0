//! Writing assistant for the editor's "generate with AI" actions.
//!
//! Each helper builds a prompt, calls `AiService::generate_text`, and
//! post-processes the free text into the shape the editor stores.

pub mod handlers;
pub mod prompts;

use std::collections::HashSet;

use tracing::debug;

use crate::ai::{AiError, AiService};
use crate::models::resume::{Experience, PersonalInfo, Skill};

use self::prompts::{experience_bullets_prompt, project_bullets_prompt, skills_prompt, summary_prompt};

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];

/// One bullet per non-blank line, list markers stripped.
pub fn parse_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            BULLET_MARKERS
                .iter()
                .find_map(|marker| line.strip_prefix(marker))
                .unwrap_or(line)
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Comma-separated suggestions minus blanks and names already present
/// (case-insensitive), in suggestion order.
pub fn parse_skill_suggestions(text: &str, existing: &[Skill]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.name.to_lowercase()).collect();
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(String::from)
        .collect()
}

pub async fn suggest_summary(
    ai: &dyn AiService,
    info: &PersonalInfo,
    experience: &[Experience],
) -> Result<String, AiError> {
    let prompt = summary_prompt(info, experience);
    let summary = ai.generate_text(&prompt).await?;
    Ok(summary.trim().to_string())
}

pub async fn suggest_experience_bullets(
    ai: &dyn AiService,
    job_title: &str,
    company: &str,
) -> Result<Vec<String>, AiError> {
    let text = ai
        .generate_text(&experience_bullets_prompt(job_title, company))
        .await?;
    let bullets = parse_bullets(&text);
    debug!("Generated {} experience bullets", bullets.len());
    Ok(bullets)
}

pub async fn suggest_project_bullets(
    ai: &dyn AiService,
    project_name: &str,
) -> Result<Vec<String>, AiError> {
    let text = ai.generate_text(&project_bullets_prompt(project_name)).await?;
    Ok(parse_bullets(&text))
}

pub async fn suggest_skills(
    ai: &dyn AiService,
    job_title: &str,
    existing: &[Skill],
) -> Result<Vec<String>, AiError> {
    let text = ai.generate_text(&skills_prompt(job_title)).await?;
    Ok(parse_skill_suggestions(&text, existing))
}
