//! In-memory repository fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use storyforge_core::clock::Clock;
use storyforge_core::error::DomainError;
use storyforge_profiles::{ProfileRepository, ProfileUpsert, UserProfile};
use storyforge_projects::{Project, ProjectDraft, ProjectPatch, ProjectRepository};
use storyforge_versions::{NewVersion, ProjectVersion, VersionRepository};
use uuid::Uuid;

/// An in-memory `ProjectRepository` with clock-driven server timestamps.
///
/// Writes can be refused wholesale to exercise rollback paths.
pub struct InMemoryProjectRepository {
    clock: Arc<dyn Clock>,
    rows: Mutex<Vec<Project>>,
    refuse_updates: AtomicBool,
    refuse_deletes: AtomicBool,
}

impl InMemoryProjectRepository {
    /// Empty repository using `clock` for server-assigned timestamps.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rows: Mutex::new(Vec::new()),
            refuse_updates: AtomicBool::new(false),
            refuse_deletes: AtomicBool::new(false),
        }
    }

    /// Pre-populates rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, projects: Vec<Project>) {
        self.rows.lock().unwrap().extend(projects);
    }

    /// Makes every subsequent `update` fail with a persistence error.
    pub fn refuse_updates(&self) {
        self.refuse_updates.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent `delete` fail with a persistence error.
    pub fn refuse_deletes(&self) {
        self.refuse_deletes.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the stored rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn rows(&self) -> Vec<Project> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, draft: ProjectDraft) -> Result<Project, DomainError> {
        let now = self.clock.now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            name: draft.name,
            framework_id: draft.framework_id,
            stages_content: draft.stages_content,
            raw_story_idea: draft.raw_story_idea,
            last_modified: now,
            created_at: now,
        };
        self.rows.lock().unwrap().push(project.clone());
        Ok(project)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ProjectPatch,
    ) -> Result<u64, DomainError> {
        if self.refuse_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("update refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|p| p.id == id && p.user_id == user_id) else {
            return Ok(0);
        };
        if let Some(stages_content) = patch.stages_content {
            row.stages_content = stages_content;
        }
        if let Some(raw_story_idea) = patch.raw_story_idea {
            row.raw_story_idea = raw_story_idea;
        }
        row.last_modified = patch.last_modified;
        Ok(1)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64, DomainError> {
        if self.refuse_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("delete refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(u64::try_from(before - rows.len()).unwrap_or(0))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let mut rows: Vec<Project> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(rows)
    }
}

/// An in-memory `VersionRepository`. Creation timestamps get a monotonic
/// microsecond offset so newest-first ordering is total even under a fixed
/// clock.
pub struct InMemoryVersionRepository {
    clock: Arc<dyn Clock>,
    rows: Mutex<Vec<ProjectVersion>>,
    refuse_inserts: AtomicBool,
}

impl InMemoryVersionRepository {
    /// Empty repository using `clock` for server-assigned timestamps.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rows: Mutex::new(Vec::new()),
            refuse_inserts: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `insert` fail with a persistence error.
    pub fn refuse_inserts(&self) {
        self.refuse_inserts.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the stored rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn rows(&self) -> Vec<ProjectVersion> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn insert(&self, version: NewVersion) -> Result<ProjectVersion, DomainError> {
        if self.refuse_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("insert refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let sequence = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        let created = ProjectVersion {
            id: Uuid::new_v4(),
            project_id: version.project_id,
            user_id: version.user_id,
            stages_content: version.stages_content,
            raw_story_idea: version.raw_story_idea,
            version_name: version.version_name,
            created_at: self.clock.now() + Duration::microseconds(sequence),
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

    async fn list_ids_newest_first(&self, project_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
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
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|v| !ids.contains(&v.id));
        Ok(u64::try_from(before - rows.len()).unwrap_or(0))
    }
}

/// An in-memory `ProfileRepository`.
pub struct InMemoryProfileRepository {
    clock: Arc<dyn Clock>,
    rows: Mutex<HashMap<Uuid, UserProfile>>,
}

impl InMemoryProfileRepository {
    /// Empty repository using `clock` for timestamps.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert(&self, profile: ProfileUpsert) -> Result<UserProfile, DomainError> {
        let now = self.clock.now();
        let mut rows = self.rows.lock().unwrap();
        let created_at = rows.get(&profile.id).map_or(now, |p| p.created_at);
        let stored = UserProfile {
            id: profile.id,
            display_name: profile.display_name,
            preferred_genres: profile.preferred_genres,
            onboarding_completed: profile.onboarding_completed,
            created_at,
            updated_at: now,
        };
        rows.insert(profile.id, stored.clone());
        Ok(stored)
    }
}
