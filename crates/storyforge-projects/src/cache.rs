//! Client-side project cache and the optimistic mutation helper.

use std::future::Future;

use storyforge_core::error::DomainError;
use uuid::Uuid;

use crate::project::Project;

/// The locally cached project list.
///
/// Invariant: always sorted by `last_modified` descending, re-established
/// after every local or remote-confirmed mutation.
#[derive(Debug, Clone, Default)]
pub struct ProjectCache {
    projects: Vec<Project>,
}

impl ProjectCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full list, e.g. after a fresh fetch.
    pub fn replace_all(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.sort();
    }

    /// Inserts or replaces one project, keeping order.
    pub fn upsert(&mut self, project: Project) {
        self.projects.retain(|p| p.id != project.id);
        self.projects.push(project);
        self.sort();
    }

    /// Removes a project; returns true if it was present.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        self.projects.len() != before
    }

    /// Drops every cached project.
    pub fn clear(&mut self) {
        self.projects.clear();
    }

    /// Looks up a cached project.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// The cached list, newest `last_modified` first.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Number of cached projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns true when no projects are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    fn sort(&mut self) {
        self.projects
            .sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    }
}

/// Applies `updated` to the active project and the cached list immediately,
/// then awaits the remote commit. On failure both are restored to their exact
/// pre-call values and the error is returned; there is no automatic retry.
///
/// This is the one optimistic-update-with-rollback path shared by
/// single-stage edits, bulk draft application, and version reverts.
///
/// # Errors
///
/// Propagates the commit's `DomainError` after rolling back.
pub async fn optimistic_update<Fut>(
    active: &mut Project,
    cache: &mut ProjectCache,
    updated: Project,
    commit: Fut,
) -> Result<(), DomainError>
where
    Fut: Future<Output = Result<(), DomainError>> + Send,
{
    let snapshot = active.clone();
    *active = updated.clone();
    cache.upsert(updated);

    match commit.await {
        Ok(()) => Ok(()),
        Err(err) => {
            *active = snapshot.clone();
            cache.upsert(snapshot);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn make_project(name: &str, modified_offset_hours: i64) -> Project {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_owned(),
            framework_id: "storyCircle".to_owned(),
            stages_content: HashMap::new(),
            raw_story_idea: None,
            last_modified: base + Duration::hours(modified_offset_hours),
            created_at: base,
        }
    }

    #[test]
    fn test_cache_keeps_newest_first_after_replace_and_upsert() {
        let mut cache = ProjectCache::new();
        let older = make_project("older", 0);
        let newer = make_project("newer", 2);

        cache.replace_all(vec![older.clone(), newer.clone()]);
        assert_eq!(cache.projects()[0].id, newer.id);

        // Touch the older project so it becomes the most recent.
        let mut touched = older.clone();
        touched.last_modified = newer.last_modified + Duration::hours(1);
        cache.upsert(touched.clone());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.projects()[0].id, older.id);
        assert_eq!(cache.projects()[0].last_modified, touched.last_modified);
    }

    #[test]
    fn test_cache_remove_reports_presence() {
        let mut cache = ProjectCache::new();
        let project = make_project("p", 0);
        cache.replace_all(vec![project.clone()]);

        assert!(cache.remove(project.id));
        assert!(!cache.remove(project.id));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_update_applies_before_commit_resolves() {
        let mut active = make_project("draft", 0);
        let mut cache = ProjectCache::new();
        cache.replace_all(vec![active.clone()]);

        let mut updated = active.clone();
        updated
            .stages_content
            .insert("you".to_owned(), "A quiet village.".to_owned());
        updated.last_modified = active.last_modified + Duration::minutes(5);

        let result = optimistic_update(&mut active, &mut cache, updated.clone(), async {
            Ok(())
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(active, updated);
        assert_eq!(cache.get(updated.id).unwrap(), &updated);
    }

    #[tokio::test]
    async fn test_failed_commit_restores_exact_pre_call_state() {
        let mut active = make_project("draft", 0);
        active
            .stages_content
            .insert("you".to_owned(), "original text".to_owned());
        let mut cache = ProjectCache::new();
        cache.replace_all(vec![active.clone(), make_project("other", 1)]);

        let pre_active = active.clone();
        let pre_list: Vec<Project> = cache.projects().to_vec();

        let mut updated = active.clone();
        updated
            .stages_content
            .insert("you".to_owned(), "rewritten text".to_owned());
        updated.last_modified = active.last_modified + Duration::minutes(5);

        let result = optimistic_update(&mut active, &mut cache, updated, async {
            Err(DomainError::Persistence("connection refused".into()))
        })
        .await;

        assert!(matches!(result, Err(DomainError::Persistence(_))));
        assert_eq!(active, pre_active);
        assert_eq!(cache.projects(), pre_list.as_slice());
    }
}
