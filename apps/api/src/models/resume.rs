//! Resume data model shared by the AI layer and the HTTP API.
//!
//! Three shapes exist:
//! - `ResumeDraft`: what an AI provider returns (every top-level field optional,
//!   no identifiers on list items).
//! - `ParsedResume`: the normalizer output. All six list fields are present and
//!   every list item carries a system-assigned `id`.
//! - `ResumeData`: the fully populated document the editor works on.
//!
//! Record decoding is lenient: models routinely emit `null`, numbers, or a bare
//! string where the schema asks for a list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end_date: String,
}

/// A single skill. Accepts either `{"name": "Go"}` or a bare `"Go"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

impl<'de> Deserialize<'de> for Skill {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SkillObject {
            #[serde(default, deserialize_with = "lenient::string")]
            id: String,
            #[serde(default, deserialize_with = "lenient::string")]
            name: String,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SkillRepr {
            Bare(String),
            Object(SkillObject),
        }

        Ok(match SkillRepr::deserialize(deserializer)? {
            SkillRepr::Bare(name) => Skill {
                id: String::new(),
                name,
            },
            SkillRepr::Object(obj) => Skill {
                id: obj.id,
                name: obj.name,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub organization: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub proficiency: String,
}

/// The canonical, fully populated resume document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub languages: Vec<Language>,
}

/// Raw resume payload decoded from an AI response. Any field may be missing.
/// An explicit `null` on a list field is treated the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDraft {
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Option<Vec<Experience>>,
    #[serde(default)]
    pub education: Option<Vec<Education>>,
    #[serde(default)]
    pub skills: Option<Vec<Skill>>,
    #[serde(default)]
    pub projects: Option<Vec<Project>>,
    #[serde(default)]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default)]
    pub languages: Option<Vec<Language>>,
}

/// Normalized resume: list fields always present, every item keyed.
/// Scalars are passed through untouched and omitted from JSON when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub languages: Vec<Language>,
}

impl ParsedResume {
    /// Fills absent scalar sections with empty values.
    #[cfg(test)]
    pub fn into_resume_data(self) -> ResumeData {
        ResumeData {
            personal_info: self.personal_info.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            experience: self.experience,
            education: self.education,
            skills: self.skills,
            projects: self.projects,
            certifications: self.certifications,
            languages: self.languages,
        }
    }
}

mod lenient {
    use super::*;

    fn value_to_string(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(value_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().filter_map(value_to_string).collect(),
            other => value_to_string(other).into_iter().collect(),
        })
    }
}
