//! Declarative resume schema used to constrain AI output.
//!
//! One static descriptor, two renderings: the native structured-output schema
//! accepted by Gemini (`responseSchema`, upper-case type tags) and a plain JSON
//! schema that can be pasted into a prompt for transports without a schema
//! parameter.

use std::sync::OnceLock;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    String,
}

impl SchemaKind {
    fn gemini_tag(self) -> &'static str {
        match self {
            SchemaKind::Object => "OBJECT",
            SchemaKind::Array => "ARRAY",
            SchemaKind::String => "STRING",
        }
    }

    fn json_schema_tag(self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub description: Option<&'static str>,
    /// Ordered object properties. Empty for arrays and strings.
    pub properties: Vec<(&'static str, SchemaNode)>,
    /// Element schema for arrays.
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    pub fn string() -> Self {
        Self {
            kind: SchemaKind::String,
            description: None,
            properties: Vec::new(),
            items: None,
        }
    }

    pub fn object(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        Self {
            kind: SchemaKind::Object,
            description: None,
            properties,
            items: None,
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: SchemaKind::Array,
            description: None,
            properties: Vec::new(),
            items: Some(Box::new(items)),
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    #[cfg(test)]
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, node)| node)
    }

    /// Native structured-output schema (Gemini `responseSchema`).
    pub fn to_gemini_schema(&self) -> Value {
        self.render(SchemaKind::gemini_tag, &|node| node.to_gemini_schema())
    }

    /// JSON-schema-like rendering for embedding in prompt text.
    pub fn to_json_schema(&self) -> Value {
        self.render(SchemaKind::json_schema_tag, &|node| node.to_json_schema())
    }

    fn render(&self, tag: fn(SchemaKind) -> &'static str, child: &dyn Fn(&SchemaNode) -> Value) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::from(tag(self.kind)));
        if let Some(description) = self.description {
            out.insert("description".to_string(), Value::from(description));
        }
        if self.kind == SchemaKind::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, node)| (name.to_string(), child(node)))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
        }
        if let Some(items) = &self.items {
            out.insert("items".to_string(), child(items));
        }
        Value::Object(out)
    }
}

/// The process-wide resume schema.
pub fn resume_schema() -> &'static SchemaNode {
    static SCHEMA: OnceLock<SchemaNode> = OnceLock::new();
    SCHEMA.get_or_init(build_resume_schema)
}

/// Compact JSON-schema text for prompt embedding.
pub fn resume_schema_text() -> &'static str {
    static TEXT: OnceLock<String> = OnceLock::new();
    TEXT.get_or_init(|| resume_schema().to_json_schema().to_string())
}

fn strings(names: &[&'static str]) -> Vec<(&'static str, SchemaNode)> {
    names.iter().map(|name| (*name, SchemaNode::string())).collect()
}

fn build_resume_schema() -> SchemaNode {
    let personal_info = SchemaNode::object(vec![
        ("fullName", SchemaNode::string().describe("Full name of the person.")),
        ("jobTitle", SchemaNode::string().describe("Most recent or desired job title.")),
        ("email", SchemaNode::string().describe("Email address.")),
        ("phone", SchemaNode::string().describe("Phone number.")),
        (
            "address",
            SchemaNode::string().describe("City and State, e.g., 'San Francisco, CA'."),
        ),
        ("linkedin", SchemaNode::string().describe("URL of LinkedIn profile.")),
        (
            "website",
            SchemaNode::string().describe("URL of personal website or portfolio."),
        ),
    ]);

    let mut experience = strings(&["jobTitle", "company", "location", "startDate", "endDate"]);
    experience.push((
        "description",
        SchemaNode::array(SchemaNode::string())
            .describe("List of responsibilities and achievements as bullet points."),
    ));

    let mut projects = strings(&["name", "link"]);
    projects.push((
        "description",
        SchemaNode::array(SchemaNode::string())
            .describe("List of project details as bullet points."),
    ));

    SchemaNode::object(vec![
        ("personalInfo", personal_info),
        (
            "summary",
            SchemaNode::string().describe("The professional summary or objective section."),
        ),
        ("experience", SchemaNode::array(SchemaNode::object(experience))),
        (
            "education",
            SchemaNode::array(SchemaNode::object(strings(&[
                "institution",
                "degree",
                "location",
                "startDate",
                "endDate",
            ]))),
        ),
        (
            "skills",
            SchemaNode::array(SchemaNode::object(strings(&["name"]))).describe("List of skills."),
        ),
        ("projects", SchemaNode::array(SchemaNode::object(projects))),
        (
            "certifications",
            SchemaNode::array(SchemaNode::object(strings(&["name", "organization", "date"]))),
        ),
        (
            "languages",
            SchemaNode::array(SchemaNode::object(strings(&["name", "proficiency"]))),
        ),
    ])
}
