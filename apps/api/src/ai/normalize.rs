//! Resume normalizer: assigns a fresh identifier to every list item returned by
//! an AI provider and guarantees all six list sections are present.
//!
//! Providers never emit identifiers, and anything that looks like one in the
//! upstream payload is overwritten. Item order is preserved.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::models::resume::{ParsedResume, ResumeDraft};

/// Generates `id-<unix millis>-<random suffix>` identifiers, unique per generator.
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            issued: HashSet::new(),
        }
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id = generate_id();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A single collision-resistant identifier. Not globally unique; a per-session
/// key for list rendering and CRUD.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("id-{}-{}", Utc::now().timestamp_millis(), &suffix[..12])
}

/// Total over any draft. Scalars (`personalInfo`, `summary`) pass through unchanged.
pub fn normalize(draft: ResumeDraft) -> ParsedResume {
    let mut ids = IdGenerator::new();

    macro_rules! keyed {
        ($field:expr) => {
            $field
                .unwrap_or_default()
                .into_iter()
                .map(|mut item| {
                    item.id = ids.next_id();
                    item
                })
                .collect()
        };
    }

    ParsedResume {
        personal_info: draft.personal_info,
        summary: draft.summary,
        experience: keyed!(draft.experience),
        education: keyed!(draft.education),
        skills: keyed!(draft.skills),
        projects: keyed!(draft.projects),
        certifications: keyed!(draft.certifications),
        languages: keyed!(draft.languages),
    }
}
