//! Project repository abstraction.

use async_trait::async_trait;
use storyforge_core::error::DomainError;
use uuid::Uuid;

use crate::project::{Project, ProjectDraft, ProjectPatch};

/// Repository contract against the remote record store.
///
/// `update` and `delete` return the definite number of rows affected. An
/// implementation that cannot determine the count must return
/// `DomainError::Persistence`; callers fail closed rather than assume
/// success.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Inserts a new project and returns the created record with
    /// server-assigned id and timestamps.
    async fn insert(&self, draft: ProjectDraft) -> Result<Project, DomainError>;

    /// Applies a patch to the project owned by `user_id`.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ProjectPatch,
    ) -> Result<u64, DomainError>;

    /// Deletes the project owned by `user_id`. Zero rows affected means the
    /// project was already gone.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64, DomainError>;

    /// All projects for a user, newest `last_modified` first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Project>, DomainError>;
}
