//! Shared application state.

use std::sync::Arc;

use storyforge_assist::AssistOrchestrator;
use storyforge_catalog::Catalog;
use storyforge_core::clock::Clock;
use storyforge_profiles::ProfileRepository;
use storyforge_projects::ProjectRepository;
use storyforge_versions::{VersionRepository, VersionStore};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The framework catalog.
    pub catalog: Arc<Catalog>,
    /// Server clock.
    pub clock: Arc<dyn Clock>,
    /// Project repository.
    pub projects: Arc<dyn ProjectRepository>,
    /// Version store (snapshot + trim).
    pub versions: VersionStore,
    /// Profile repository.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Assist orchestrator; `None` when no provider key is configured.
    pub assist: Option<Arc<AssistOrchestrator>>,
}

impl AppState {
    /// Creates new application state.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        clock: Arc<dyn Clock>,
        projects: Arc<dyn ProjectRepository>,
        versions: Arc<dyn VersionRepository>,
        profiles: Arc<dyn ProfileRepository>,
        assist: Option<Arc<AssistOrchestrator>>,
    ) -> Self {
        Self {
            catalog,
            clock,
            projects,
            versions: VersionStore::new(versions),
            profiles,
            assist,
        }
    }
}
