//! The framework catalog.

use std::collections::HashSet;

use serde::Deserialize;
use storyforge_core::error::DomainError;

use crate::framework::Framework;

/// The built-in framework definitions, embedded at compile time.
const BUILTIN_FRAMEWORKS: &str = include_str!("../data/frameworks.yaml");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    frameworks: Vec<Framework>,
}

/// Read-only catalog of narrative frameworks.
#[derive(Debug, Clone)]
pub struct Catalog {
    frameworks: Vec<Framework>,
}

impl Catalog {
    /// Loads the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the embedded document is
    /// malformed, which is a packaging defect surfaced at startup rather than on
    /// first lookup.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_yaml(BUILTIN_FRAMEWORKS)
    }

    /// Parses and validates a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document fails to parse, a
    /// framework id is duplicated, a framework has no stages, or a stage id
    /// is duplicated within its framework.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let document: CatalogDocument = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("framework catalog is malformed: {e}")))?;

        let mut framework_ids = HashSet::new();
        for framework in &document.frameworks {
            if !framework_ids.insert(framework.id.clone()) {
                return Err(DomainError::Validation(format!(
                    "duplicate framework id: {}",
                    framework.id
                )));
            }
            if framework.stages.is_empty() {
                return Err(DomainError::Validation(format!(
                    "framework {} has no stages",
                    framework.id
                )));
            }
            let mut stage_ids = HashSet::new();
            for stage in &framework.stages {
                if !stage_ids.insert(stage.id.clone()) {
                    return Err(DomainError::Validation(format!(
                        "duplicate stage id {} in framework {}",
                        stage.id, framework.id
                    )));
                }
            }
        }

        Ok(Self {
            frameworks: document.frameworks,
        })
    }

    /// All frameworks in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Looks up a framework by id.
    #[must_use]
    pub fn get(&self, framework_id: &str) -> Option<&Framework> {
        self.frameworks.iter().find(|f| f.id == framework_id)
    }
}
