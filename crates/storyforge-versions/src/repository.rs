//! Version repository abstraction.

use async_trait::async_trait;
use storyforge_core::error::DomainError;
use uuid::Uuid;

use crate::version::{NewVersion, ProjectVersion};

/// Repository contract for version rows. Versions are immutable: only
/// inserted, listed, and batch-deleted by trimming.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Inserts a new version and returns the created record.
    async fn insert(&self, version: NewVersion) -> Result<ProjectVersion, DomainError>;

    /// Versions for a project owned by `user_id`, newest first, capped at
    /// `limit`.
    async fn list_for_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ProjectVersion>, DomainError>;

    /// All version ids for a project, newest first. Used by trimming.
    async fn list_ids_newest_first(&self, project_id: Uuid) -> Result<Vec<Uuid>, DomainError>;

    /// Deletes the given version rows in one batch.
    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError>;
}
