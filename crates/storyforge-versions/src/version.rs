//! Version records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyforge_projects::Project;
use uuid::Uuid;

/// An immutable, timestamped copy of a project's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVersion {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Project this version belongs to.
    pub project_id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Full stage-content snapshot.
    pub stages_content: HashMap<String, String>,
    /// Raw idea snapshot.
    pub raw_story_idea: Option<String>,
    /// Human-readable label describing what triggered this version.
    pub version_name: String,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a version; id and timestamp are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVersion {
    /// Project this version belongs to.
    pub project_id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Full stage-content snapshot.
    pub stages_content: HashMap<String, String>,
    /// Raw idea snapshot.
    pub raw_story_idea: Option<String>,
    /// Human-readable label.
    pub version_name: String,
}

impl NewVersion {
    /// Snapshots a project's current content under `label`.
    #[must_use]
    pub fn of_project(project: &Project, label: &str) -> Self {
        Self {
            project_id: project.id,
            user_id: project.user_id,
            stages_content: project.stages_content.clone(),
            raw_story_idea: project.raw_story_idea.clone(),
            version_name: label.to_owned(),
        }
    }
}
