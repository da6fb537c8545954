//! Framework and stage definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One named slot within a framework that the user fills with story text.
///
/// A stage carries no content itself; content lives in the project, keyed by
/// stage id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Identifier, unique within its framework.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What belongs in this stage.
    pub description: String,
}

/// A named, ordered template of narrative stages a project is structured
/// around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    /// Stable string key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description of the narrative pattern.
    pub description: String,
    /// Ordered stages.
    pub stages: Vec<Stage>,
}

impl Framework {
    /// Looks up a stage by id.
    #[must_use]
    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Returns true if `stage_id` belongs to this framework.
    #[must_use]
    pub fn has_stage(&self, stage_id: &str) -> bool {
        self.stage(stage_id).is_some()
    }

    /// Returns a content mapping with every stage keyed to an empty string.
    #[must_use]
    pub fn empty_content(&self) -> HashMap<String, String> {
        self.stages
            .iter()
            .map(|s| (s.id.clone(), String::new()))
            .collect()
    }
}
