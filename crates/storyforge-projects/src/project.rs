//! Project records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted project row.
///
/// `stages_content` keys are a subset of the owning framework's stage ids; an
/// absent key reads as empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Framework this project is structured around.
    pub framework_id: String,
    /// Story text per stage id.
    pub stages_content: HashMap<String, String>,
    /// The initial raw idea, if one was provided.
    pub raw_story_idea: Option<String>,
    /// Server-maintained last-modified timestamp.
    pub last_modified: DateTime<Utc>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Content for a stage; absent keys read as empty.
    #[must_use]
    pub fn stage_content(&self, stage_id: &str) -> &str {
        self.stages_content.get(stage_id).map_or("", String::as_str)
    }

    /// Returns true if a stage holds non-whitespace content.
    #[must_use]
    pub fn stage_filled(&self, stage_id: &str) -> bool {
        !self.stage_content(stage_id).trim().is_empty()
    }

    /// Returns true if the project carries a non-blank raw idea.
    #[must_use]
    pub fn has_raw_idea(&self) -> bool {
        self.raw_story_idea
            .as_deref()
            .is_some_and(|idea| !idea.trim().is_empty())
    }
}

/// Fields for creating a project; id and timestamps are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Framework id.
    pub framework_id: String,
    /// Initial per-stage content.
    pub stages_content: HashMap<String, String>,
    /// The raw idea, if any.
    pub raw_story_idea: Option<String>,
}

/// A partial update to a project's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// Replacement stage content, if changed.
    pub stages_content: Option<HashMap<String, String>>,
    /// Replacement raw idea, if changed (`Some(None)` clears it).
    pub raw_story_idea: Option<Option<String>>,
    /// New last-modified timestamp.
    pub last_modified: DateTime<Utc>,
}

impl ProjectPatch {
    /// Patch that replaces stage content.
    #[must_use]
    pub fn content(stages_content: HashMap<String, String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            stages_content: Some(stages_content),
            raw_story_idea: None,
            last_modified,
        }
    }

    /// Also replaces the raw idea.
    #[must_use]
    pub fn with_raw_idea(mut self, raw_story_idea: Option<String>) -> Self {
        self.raw_story_idea = Some(raw_story_idea);
        self
    }
}
