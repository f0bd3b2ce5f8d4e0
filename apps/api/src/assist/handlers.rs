//! Axum route handlers for the writing assistant.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assist::{
    suggest_experience_bullets, suggest_project_bullets, suggest_skills, suggest_summary,
};
use crate::errors::AppError;
use crate::models::resume::{Experience, PersonalInfo, Skill};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceBulletsRequest {
    pub job_title: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectBulletsRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BulletsResponse {
    pub bullets: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsRequest {
    pub job_title: String,
    #[serde(default)]
    pub existing: Vec<Skill>,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// POST /api/v1/assist/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary =
        suggest_summary(state.ai.as_ref(), &request.personal_info, &request.experience).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /api/v1/assist/experience-bullets
pub async fn handle_experience_bullets(
    State(state): State<AppState>,
    Json(request): Json<ExperienceBulletsRequest>,
) -> Result<Json<BulletsResponse>, AppError> {
    require(&request.job_title, "jobTitle")?;
    let bullets =
        suggest_experience_bullets(state.ai.as_ref(), &request.job_title, &request.company).await?;
    Ok(Json(BulletsResponse { bullets }))
}

/// POST /api/v1/assist/project-bullets
pub async fn handle_project_bullets(
    State(state): State<AppState>,
    Json(request): Json<ProjectBulletsRequest>,
) -> Result<Json<BulletsResponse>, AppError> {
    require(&request.name, "name")?;
    let bullets = suggest_project_bullets(state.ai.as_ref(), &request.name).await?;
    Ok(Json(BulletsResponse { bullets }))
}

/// POST /api/v1/assist/skills
pub async fn handle_skills(
    State(state): State<AppState>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    require(&request.job_title, "jobTitle")?;
    let skills = suggest_skills(state.ai.as_ref(), &request.job_title, &request.existing).await?;
    Ok(Json(SkillsResponse { skills }))
}
