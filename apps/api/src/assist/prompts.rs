// Writing-assistant prompt builders, one per editor section.

use crate::models::resume::{Experience, PersonalInfo};

pub fn summary_prompt(info: &PersonalInfo, experience: &[Experience]) -> String {
    let roles = experience
        .iter()
        .map(|e| format!("{} at {}", e.job_title, e.company))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Based on the job title \"{}\" and the following experiences: {}, write a compelling \
         and professional resume summary of 2-3 sentences.",
        info.job_title, roles
    )
}

pub fn experience_bullets_prompt(job_title: &str, company: &str) -> String {
    format!(
        "For a resume, write 3-4 concise, action-oriented bullet points for the role of \
         \"{job_title}\" at \"{company}\". Focus on achievements and responsibilities. \
         Output each bullet point on a new line."
    )
}

pub fn project_bullets_prompt(project_name: &str) -> String {
    format!(
        "For a resume project section, write 2-3 concise, action-oriented bullet points for a \
         project named \"{project_name}\". Focus on the tech stack used and the problems solved. \
         Output each bullet point on a new line."
    )
}

pub fn skills_prompt(job_title: &str) -> String {
    format!(
        "Based on the job title \"{job_title}\", suggest 8-10 relevant technical and soft skills \
         for a resume. List them separated by commas."
    )
}
