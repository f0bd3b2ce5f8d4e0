// Prompt text shared by the provider adapters.

use crate::ai::schema::resume_schema_text;

pub const PARSE_SYSTEM: &str = "\
You are an expert resume parsing AI. Your sole purpose is to accurately extract information \
from a resume file and convert it into a structured JSON object based on the provided schema. \
You must handle various resume formats and layouts gracefully. Do not invent information. \
If a piece of information is not present, omit it or use an empty value as appropriate for the schema.";

pub const PARSE_INSTRUCTION: &str = "\
Analyze the provided resume. Extract all information and structure it as a JSON object that \
adheres to the provided schema. If a section is missing (e.g., no projects), provide an empty \
array. Format dates concisely.";

pub const PARSE_IMAGE_INSTRUCTION: &str = "\
Analyze the provided resume image. Extract all information and structure it as a JSON object \
that adheres to the schema provided in the system prompt. If a section is missing (e.g., no \
projects), provide an empty array for that key. Format dates concisely.";

pub const PARSE_TEXT_INSTRUCTION: &str = "\
Analyze the resume text below. Extract all information and structure it as a JSON object \
that adheres to the schema provided in the system prompt. If a section is missing (e.g., no \
projects), provide an empty array for that key. Format dates concisely.";

/// System prompt for transports without a schema parameter: the JSON schema is inlined.
pub fn parse_system_with_schema() -> String {
    format!(
        "{PARSE_SYSTEM} The output MUST be a valid JSON object that strictly adheres to this schema: {}",
        resume_schema_text()
    )
}
