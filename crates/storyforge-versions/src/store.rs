//! Snapshot and trim logic.

use std::sync::Arc;

use storyforge_core::error::DomainError;
use storyforge_projects::Project;
use uuid::Uuid;

use crate::repository::VersionRepository;
use crate::version::{NewVersion, ProjectVersion};

/// Maximum versions retained per project.
pub const MAX_VERSIONS: usize = 15;

/// Appends immutable snapshots and keeps history bounded.
#[derive(Clone)]
pub struct VersionStore {
    repo: Arc<dyn VersionRepository>,
}

impl VersionStore {
    /// Creates a store over the given repository.
    #[must_use]
    pub fn new(repo: Arc<dyn VersionRepository>) -> Self {
        Self { repo }
    }

    /// Snapshots the project's current content under `label`, then trims the
    /// history to the newest [`MAX_VERSIONS`] rows.
    ///
    /// Post-insert failures (listing or trimming) are logged at warn and do
    /// not fail the call: history integrity favors "have it, untrimmed" over
    /// losing the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` only when the insert itself fails.
    pub async fn snapshot(
        &self,
        project: &Project,
        label: &str,
    ) -> Result<ProjectVersion, DomainError> {
        let created = self
            .repo
            .insert(NewVersion::of_project(project, label))
            .await?;

        match self.repo.list_ids_newest_first(project.id).await {
            Ok(ids) if ids.len() > MAX_VERSIONS => {
                let stale = &ids[MAX_VERSIONS..];
                if let Err(err) = self.repo.delete_by_ids(stale).await {
                    tracing::warn!(
                        project_id = %project.id,
                        stale = stale.len(),
                        error = %err,
                        "failed to trim old project versions"
                    );
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    project_id = %project.id,
                    error = %err,
                    "failed to list versions for trimming"
                );
            }
        }

        Ok(created)
    }

    /// Up to [`MAX_VERSIONS`] versions for the project, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the listing fails.
    pub async fn list_versions(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ProjectVersion>, DomainError> {
        self.repo
            .list_for_project(project_id, user_id, MAX_VERSIONS)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    /// In-crate fake: appends versions with a strictly increasing timestamp
    /// and can be told to fail individual operations.
    #[derive(Default)]
    struct FakeVersionRepository {
        rows: Mutex<Vec<ProjectVersion>>,
        next_sequence: AtomicI64,
        fail_insert: bool,
        fail_list_ids: bool,
        fail_delete: bool,
    }

    #[async_trait]
    impl VersionRepository for FakeVersionRepository {
        async fn insert(&self, version: NewVersion) -> Result<ProjectVersion, DomainError> {
            if self.fail_insert {
                return Err(DomainError::Persistence("insert refused".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
            let created = ProjectVersion {
                id: Uuid::new_v4(),
                project_id: version.project_id,
                user_id: version.user_id,
                stages_content: version.stages_content,
                raw_story_idea: version.raw_story_idea,
                version_name: version.version_name,
                created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
                    + Duration::seconds(sequence),
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn list_for_project(
            &self,
            project_id: Uuid,
            user_id: Uuid,
            limit: usize,
        ) -> Result<Vec<ProjectVersion>, DomainError> {
            let mut rows: Vec<ProjectVersion> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.project_id == project_id && v.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(limit);
            Ok(rows)
        }

        async fn list_ids_newest_first(
            &self,
            project_id: Uuid,
        ) -> Result<Vec<Uuid>, DomainError> {
            if self.fail_list_ids {
                return Err(DomainError::Persistence("listing refused".into()));
            }
            let mut rows: Vec<ProjectVersion> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.project_id == project_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows.into_iter().map(|v| v.id).collect())
        }

        async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
            if self.fail_delete {
                return Err(DomainError::Persistence("delete refused".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|v| !ids.contains(&v.id));
            Ok(u64::try_from(before - rows.len()).unwrap())
        }
    }

    fn make_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Draft".to_owned(),
            framework_id: "storyCircle".to_owned(),
            stages_content: HashMap::from([("you".to_owned(), "content".to_owned())]),
            raw_story_idea: Some("an idea".to_owned()),
            last_modified: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_history_never_exceeds_max_versions() {
        let repo = Arc::new(FakeVersionRepository::default());
        let store = VersionStore::new(repo.clone());
        let project = make_project();

        for i in 0..MAX_VERSIONS + 5 {
            store
                .snapshot(&project, &format!("Snapshot {i}"))
                .await
                .unwrap();
        }

        let retained = store
            .list_versions(project.id, project.user_id)
            .await
            .unwrap();
        assert_eq!(retained.len(), MAX_VERSIONS);

        // The retained rows are the most recently created ones.
        let labels: Vec<&str> = retained.iter().map(|v| v.version_name.as_str()).collect();
        assert_eq!(labels[0], "Snapshot 19");
        assert_eq!(labels[MAX_VERSIONS - 1], "Snapshot 5");

        // Nothing beyond the cap survives in the underlying repository.
        let ids = repo.list_ids_newest_first(project.id).await.unwrap();
        assert_eq!(ids.len(), MAX_VERSIONS);
    }

    #[tokio::test]
    async fn test_snapshot_carries_full_project_content() {
        let repo = Arc::new(FakeVersionRepository::default());
        let store = VersionStore::new(repo);
        let project = make_project();

        let created = store.snapshot(&project, "Project Created").await.unwrap();

        assert_eq!(created.project_id, project.id);
        assert_eq!(created.user_id, project.user_id);
        assert_eq!(created.stages_content, project.stages_content);
        assert_eq!(created.raw_story_idea, project.raw_story_idea);
        assert_eq!(created.version_name, "Project Created");
    }

    #[tokio::test]
    async fn test_trim_failure_does_not_fail_the_snapshot() {
        let repo = Arc::new(FakeVersionRepository {
            fail_delete: true,
            ..FakeVersionRepository::default()
        });
        let store = VersionStore::new(repo.clone());
        let project = make_project();

        for i in 0..MAX_VERSIONS + 2 {
            store
                .snapshot(&project, &format!("Snapshot {i}"))
                .await
                .unwrap();
        }

        // Untrimmed rows remain; the next successful trim would correct this.
        let ids = repo.list_ids_newest_first(project.id).await.unwrap();
        assert_eq!(ids.len(), MAX_VERSIONS + 2);
    }

    #[tokio::test]
    async fn test_listing_failure_during_trim_is_non_fatal() {
        let repo = Arc::new(FakeVersionRepository {
            fail_list_ids: true,
            ..FakeVersionRepository::default()
        });
        let store = VersionStore::new(repo);
        let project = make_project();

        let result = store.snapshot(&project, "Snapshot").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_insert_failure_propagates() {
        let repo = Arc::new(FakeVersionRepository {
            fail_insert: true,
            ..FakeVersionRepository::default()
        });
        let store = VersionStore::new(repo);
        let project = make_project();

        let result = store.snapshot(&project, "Snapshot").await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
    }
}
