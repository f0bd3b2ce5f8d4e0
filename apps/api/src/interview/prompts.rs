// Resume interview prompt text.

use crate::ai::schema::resume_schema_text;

/// Opening line shown before the first user message. Client-side only.
pub const GREETING: &str = "Hello! I'm your AI assistant. I'll ask you a series of questions to \
    build your resume.\n\nFirst, what is your full name and desired job title?";

/// Sent when the user is done, asking the model for the final JSON.
pub const FINISH_MESSAGE: &str = "I've provided all my information. Please generate the complete \
    resume data as a JSON object now, following your system instructions. Do not add any other text.";

pub const FINISH_FAILURE_MESSAGE: &str = "The AI failed to create the resume data. You can try \
    asking it to 'generate the JSON now', or close this and build your resume manually.";

pub fn interview_instruction() -> String {
    format!(
        "You are a friendly and professional AI assistant for freeresume.me. Your goal is to help \
users build a resume by asking them questions one by one.
1. Start by greeting the user and asking for their full name and desired job title.
2. Then, ask for other personal details (email, phone, etc.).
3. After that, ask for their professional summary, then work experience (one job at a time), \
education, skills, and any other sections like projects, certifications, or languages.
4. Keep your questions clear and concise.
5. When the user indicates they are finished providing information, you MUST respond with ONLY \
a valid JSON object containing all the collected data. This JSON object must strictly follow \
this JSON schema: {}.
6. Do not include any other text, greetings, or markdown formatting (like ```json) in your final \
JSON response. The response must be the raw JSON object itself.",
        resume_schema_text()
    )
}
