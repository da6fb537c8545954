//! The session controller.
//!
//! One handler per user-visible transition. Hard failures return
//! `DomainError` after any optimistic state has been rolled back; gates and
//! refusals are not errors — they record an upgrade prompt or leave state
//! untouched and return without a value.

use std::collections::HashMap;
use std::sync::Arc;

use storyforge_assist::{AssistOrchestrator, OutputMode, QuestionAnswer, StageContext};
use storyforge_catalog::{Catalog, Framework};
use storyforge_core::clock::Clock;
use storyforge_core::device::DeviceStore;
use storyforge_core::error::DomainError;
use storyforge_profiles::{ProfileRepository, ProfileUpsert};
use storyforge_projects::{Project, ProjectDraft, ProjectPatch, ProjectRepository, optimistic_update};
use storyforge_usage::{
    SubscriptionTier, UpgradeSource, UsageDecision, UsageKind, can_create_project,
    full_story_available,
};
use storyforge_versions::{VersionRepository, VersionStore};
use uuid::Uuid;

use crate::domain::state::{
    DraftScope, FullStorySuggestion, IDEA_DRAFT_KEY, NoticeLevel, PendingProject, SessionState,
    last_active_key,
};

/// Owns the session state and the seams to every collaborator.
pub struct SessionController {
    state: SessionState,
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    projects: Arc<dyn ProjectRepository>,
    versions: VersionStore,
    profiles: Arc<dyn ProfileRepository>,
    device: Arc<dyn DeviceStore>,
    assist: Option<AssistOrchestrator>,
}

impl SessionController {
    /// Creates a controller with a fresh logged-out state.
    ///
    /// `assist` is `None` when no provider key is configured; AI operations
    /// then fail with a validation error, and framework selection maps the
    /// idea to all-empty stages without a network call.
    #[must_use]
    pub fn new(
        catalog: Catalog,
        clock: Arc<dyn Clock>,
        projects: Arc<dyn ProjectRepository>,
        versions: Arc<dyn VersionRepository>,
        profiles: Arc<dyn ProfileRepository>,
        device: Arc<dyn DeviceStore>,
        assist: Option<AssistOrchestrator>,
    ) -> Self {
        let state = SessionState::new(clock.as_ref());
        Self {
            state,
            catalog,
            clock,
            projects,
            versions: VersionStore::new(versions),
            profiles,
            device,
            assist,
        }
    }

    /// Read access to the session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access for notice draining and UI-local fields.
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    fn framework_of(&self, project: &Project) -> Result<&Framework, DomainError> {
        self.catalog.get(&project.framework_id).ok_or_else(|| {
            DomainError::Validation(format!("unknown framework: {}", project.framework_id))
        })
    }

    /// Best-effort version snapshot after an accepted mutation; failure is
    /// logged and surfaced as a notice, never unwinding the mutation.
    async fn snapshot_version(&mut self, project: &Project, label: &str) {
        if let Err(err) = self.versions.snapshot(project, label).await {
            tracing::warn!(project_id = %project.id, error = %err, "failed to save project version");
            self.state.notify(
                NoticeLevel::Error,
                format!("Failed to save project version: {err}"),
            );
        }
    }

    /// Best-effort refresh of the cached version list for a project.
    async fn refresh_versions(&mut self, project_id: Uuid) {
        let Some(user_id) = self.state.user_id else {
            return;
        };
        match self.versions.list_versions(project_id, user_id).await {
            Ok(versions) => self.state.versions = versions,
            Err(err) => {
                self.state.versions.clear();
                self.state.notify(
                    NoticeLevel::Error,
                    format!("Failed to load project versions: {err}"),
                );
            }
        }
    }

    async fn refresh_projects(&mut self, user_id: Uuid) {
        match self.projects.list_by_user(user_id).await {
            Ok(projects) => self.state.cache.replace_all(projects),
            Err(err) => {
                self.state.cache.clear();
                self.state.banner_error = Some(format!("Could not load your projects: {err}"));
            }
        }
    }

    /// Logs a user in: fetches the profile (missing or incomplete profile
    /// leaves onboarding pending), loads the project list, and restores the
    /// last active project from device storage.
    pub async fn login(&mut self, user_id: Uuid) {
        self.state = SessionState::new(self.clock.as_ref());
        self.state.user_id = Some(user_id);

        match self.profiles.fetch(user_id).await {
            Ok(Some(profile)) => {
                self.state.onboarding_pending = !profile.onboarding_completed;
                self.state.profile = Some(profile);
            }
            Ok(None) => self.state.onboarding_pending = true,
            Err(err) => {
                self.state.notify(
                    NoticeLevel::Error,
                    format!("Failed to load user profile: {err}"),
                );
            }
        }

        self.refresh_projects(user_id).await;
        self.restore_last_active(user_id).await;
    }

    async fn restore_last_active(&mut self, user_id: Uuid) {
        let key = last_active_key(user_id);
        let Some(stored) = self.device.get(&key) else {
            return;
        };
        let Some(project) = Uuid::parse_str(&stored)
            .ok()
            .and_then(|id| self.state.cache.get(id).cloned())
        else {
            // Stale pointer: the project is gone.
            self.device.remove(&key);
            return;
        };

        self.state.selected_framework_id = Some(project.framework_id.clone());
        self.state.raw_idea = project.raw_story_idea.clone().unwrap_or_default();
        let project_id = project.id;
        self.state.active_project = Some(project);
        self.refresh_versions(project_id).await;
    }

    /// Hard reset of all session-scoped state with no partial carryover.
    pub fn logout(&mut self) {
        self.state = SessionState::new(self.clock.as_ref());
    }

    /// Updates the idea-entry buffer, persisting a draft to device storage
    /// only while there is no session and no project.
    pub fn set_raw_idea(&mut self, text: impl Into<String>) {
        self.state.raw_idea = text.into();
        if self.state.user_id.is_none() && self.state.active_project.is_none() {
            self.device.set(IDEA_DRAFT_KEY, &self.state.raw_idea);
        }
    }

    /// Restores a previously saved idea draft, if any. Only meaningful while
    /// logged out with no project.
    pub fn restore_idea_draft(&mut self) {
        if self.state.user_id.is_none() && self.state.active_project.is_none() {
            if let Some(draft) = self.device.get(IDEA_DRAFT_KEY) {
                self.state.raw_idea = draft;
            }
        }
    }

    fn reset_to_idle(&mut self) {
        if let Some(user_id) = self.state.user_id {
            self.device.remove(&last_active_key(user_id));
        }
        self.device.remove(IDEA_DRAFT_KEY);
        self.state.active_project = None;
        self.state.selected_framework_id = None;
        self.state.raw_idea.clear();
        self.state.pending_project = None;
        self.state.awaiting_title = false;
        self.state.confirming_delete = None;
        self.state.generating_all = false;
        self.state.reverting_version = None;
        self.state.versions.clear();
        self.state.banner_error = None;
    }

    /// Clears the workspace for a fresh story. Gated by the project-count
    /// capability for the current tier.
    pub fn start_new_story(&mut self) {
        if !can_create_project(self.state.tier, self.state.cache.len()) {
            self.state.prompt_upgrade(UpgradeSource::ProjectLimit);
            return;
        }
        self.reset_to_idle();
    }

    /// Selects a framework: maps the raw idea across its stages (through the
    /// provider when an idea and a provider are present) and transitions to
    /// awaiting-title. On mapping failure, returns to idle with an error and
    /// discards any partial mapping.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` when idea mapping fails.
    pub async fn select_framework(&mut self, framework_id: &str) -> Result<(), DomainError> {
        if self.state.user_id.is_none() {
            self.state.notify(
                NoticeLevel::Error,
                "Please log in to create a new story project.",
            );
            return Ok(());
        }
        if !can_create_project(self.state.tier, self.state.cache.len()) {
            self.state.prompt_upgrade(UpgradeSource::ProjectLimit);
            return Ok(());
        }
        if self.state.confirming_delete.is_some() || self.state.bulk_locked() {
            return Ok(());
        }
        let Some(framework) = self.catalog.get(framework_id).cloned() else {
            return Ok(());
        };

        self.state.banner_error = None;
        let has_idea = !self.state.raw_idea.trim().is_empty();

        let stages_content = if has_idea && self.assist.is_some() {
            let orchestrator = self.assist.as_ref().expect("checked above").clone();
            match orchestrator
                .map_idea_to_framework(&self.state.raw_idea, &framework)
                .await
            {
                Ok(mapped) => mapped,
                Err(err) => {
                    self.state.banner_error =
                        Some(format!("An error occurred during idea processing: {err}"));
                    self.state.pending_project = None;
                    self.state.awaiting_title = false;
                    self.state.selected_framework_id = None;
                    return Err(err);
                }
            }
        } else {
            framework.empty_content()
        };

        self.state.pending_project = Some(PendingProject {
            framework_id: framework.id.clone(),
            stages_content,
            raw_story_idea: has_idea.then(|| self.state.raw_idea.clone()),
        });
        self.state.selected_framework_id = Some(framework.id);
        self.state.awaiting_title = true;
        Ok(())
    }

    /// Abandons title entry, returning to idle without creating anything.
    pub fn cancel_title_entry(&mut self) {
        self.state.awaiting_title = false;
        self.state.pending_project = None;
        self.state.selected_framework_id = None;
    }

    /// Creates the project from the pending mapping, snapshots a
    /// "Project Created" version, and activates it. An empty title falls back
    /// to a dated default name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Persistence` when the insert fails; the pending
    /// mapping is kept so the submission can be retried.
    pub async fn submit_project_title(&mut self, title: &str) -> Result<(), DomainError> {
        let (Some(user_id), Some(pending), true) = (
            self.state.user_id,
            self.state.pending_project.clone(),
            self.state.awaiting_title,
        ) else {
            self.state.banner_error =
                Some("Could not create project. User session or pending data was missing.".into());
            self.cancel_title_entry();
            return Ok(());
        };

        self.state.banner_error = None;
        let name = if title.trim().is_empty() {
            format!("Untitled Story ({})", self.clock.now().format("%Y-%m-%d"))
        } else {
            title.trim().to_owned()
        };

        let draft = ProjectDraft {
            user_id,
            name,
            framework_id: pending.framework_id,
            stages_content: pending.stages_content,
            raw_story_idea: pending.raw_story_idea,
        };

        let created = match self.projects.insert(draft).await {
            Ok(project) => project,
            Err(err) => {
                self.state.banner_error = Some(format!("Failed to save project: {err}"));
                return Err(err);
            }
        };

        self.state.cache.upsert(created.clone());
        self.state.active_project = Some(created.clone());
        self.snapshot_version(&created, "Project Created").await;
        self.refresh_versions(created.id).await;

        self.state.awaiting_title = false;
        self.state.pending_project = None;
        self.state.raw_idea.clear();
        self.device.remove(IDEA_DRAFT_KEY);
        self.device
            .set(&last_active_key(user_id), &created.id.to_string());
        Ok(())
    }

    /// Activates a cached project. Refused while a delete of that project,
    /// a bulk generation, or a revert is in flight.
    pub async fn load_project(&mut self, project_id: Uuid) {
        if self.state.bulk_locked() {
            return;
        }
        if self
            .state
            .confirming_delete
            .as_ref()
            .is_some_and(|p| p.id == project_id)
        {
            return;
        }
        let Some(project) = self.state.cache.get(project_id).cloned() else {
            return;
        };

        self.state.selected_framework_id = Some(project.framework_id.clone());
        self.state.raw_idea = project.raw_story_idea.clone().unwrap_or_default();
        self.state.banner_error = None;
        self.state.awaiting_title = false;
        self.state.pending_project = None;
        self.state.confirming_delete = None;
        self.state.active_project = Some(project);

        if let Some(user_id) = self.state.user_id {
            self.device
                .set(&last_active_key(user_id), &project_id.to_string());
        }
        self.refresh_versions(project_id).await;
    }

    /// Applies one stage edit optimistically, then persists. On success a
    /// version labeled with the stage name is snapshotted; on failure the
    /// active project and cached list are restored exactly and the error is
    /// surfaced. Disabled while a bulk generation or revert is in flight.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from the remote write, after rollback.
    pub async fn update_stage(
        &mut self,
        stage_id: &str,
        content: &str,
    ) -> Result<(), DomainError> {
        if self.state.bulk_locked() || self.state.active_project.is_none() {
            return Ok(());
        }
        let active_snapshot = self.state.active_project.clone().expect("checked above");
        let framework = self.framework_of(&active_snapshot)?;
        let Some(stage) = framework.stage(stage_id) else {
            return Err(DomainError::Validation(format!(
                "stage {stage_id} does not belong to framework {}",
                framework.id
            )));
        };
        let stage_name = stage.name.clone();

        self.state.banner_error = None;
        let now = self.clock.now();
        let mut updated = active_snapshot.clone();
        updated
            .stages_content
            .insert(stage_id.to_owned(), content.to_owned());
        updated.last_modified = now;

        let patch = ProjectPatch::content(updated.stages_content.clone(), now);
        let repo = Arc::clone(&self.projects);
        let (project_id, user_id) = (updated.id, updated.user_id);
        let commit = async move {
            match repo.update(project_id, user_id, patch).await? {
                0 => Err(DomainError::NotFound(project_id)),
                _ => Ok(()),
            }
        };

        let active = self.state.active_project.as_mut().expect("checked above");
        match optimistic_update(active, &mut self.state.cache, updated.clone(), commit).await {
            Ok(()) => {
                self.snapshot_version(&updated, &format!("Stage: '{stage_name}' Updated"))
                    .await;
                self.refresh_versions(project_id).await;
                Ok(())
            }
            Err(err) => {
                self.state.banner_error = Some(format!("Failed to save changes: {err}"));
                Err(err)
            }
        }
    }

    fn assist_or_unconfigured(&self) -> Result<&AssistOrchestrator, DomainError> {
        self.assist
            .as_ref()
            .ok_or_else(|| DomainError::Validation("text provider is not configured".into()))
    }

    /// Story context for a single-stage generation: the raw idea followed by
    /// every earlier stage that already has content.
    fn story_context_for(&self, project: &Project, framework: &Framework, stage_id: &str) -> String {
        let mut context = String::new();
        if let Some(idea) = project.raw_story_idea.as_deref().filter(|i| !i.trim().is_empty()) {
            context.push_str(&format!("Raw Story Idea:\n{idea}\n\n---\n\n"));
        }
        for stage in &framework.stages {
            if stage.id == stage_id {
                break;
            }
            let content = project.stage_content(&stage.id);
            if !content.trim().is_empty() {
                context.push_str(&format!("{}:\n{}\n\n", stage.name, content));
            }
        }
        context
    }

    /// Generates clarifying questions for a stage, gated by the daily quota.
    /// `Ok(None)` means the quota denied the call and an upgrade prompt was
    /// raised; the provider is never invoked in that case.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` without a configured provider or
    /// active project, `DomainError::Provider` on generation failure.
    pub async fn request_clarifying_questions(
        &mut self,
        stage_id: &str,
        instruction: Option<&str>,
    ) -> Result<Option<Vec<String>>, DomainError> {
        let orchestrator = self.assist_or_unconfigured()?.clone();
        let Some(project) = self.state.active_project.clone() else {
            return Err(DomainError::Validation("no active project".into()));
        };
        let framework = self.framework_of(&project)?.clone();
        let Some(stage) = framework.stage(stage_id) else {
            return Err(DomainError::Validation(format!("unknown stage: {stage_id}")));
        };

        match self.state.usage.check_and_increment(
            self.state.tier,
            UsageKind::ClarifyingQuestion,
            self.clock.as_ref(),
        ) {
            UsageDecision::Permitted => {}
            UsageDecision::Denied { source } => {
                self.state.prompt_upgrade(source);
                return Ok(None);
            }
        }

        let ctx = StageContext {
            stage_name: stage.name.clone(),
            stage_description: stage.description.clone(),
            story_context: self.story_context_for(&project, &framework, stage_id),
        };
        orchestrator
            .clarifying_questions(&ctx, instruction)
            .await
            .map(Some)
    }

    /// Generates a suggestion for one stage, gated by the daily quota.
    /// `Ok(None)` means the quota denied the call.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` without a configured provider or
    /// active project, `DomainError::Provider` on generation failure.
    pub async fn request_stage_suggestion(
        &mut self,
        stage_id: &str,
        mode: OutputMode,
        answers: &[QuestionAnswer],
        instruction: Option<&str>,
    ) -> Result<Option<String>, DomainError> {
        let orchestrator = self.assist_or_unconfigured()?.clone();
        let Some(project) = self.state.active_project.clone() else {
            return Err(DomainError::Validation("no active project".into()));
        };
        let framework = self.framework_of(&project)?.clone();
        let Some(stage) = framework.stage(stage_id) else {
            return Err(DomainError::Validation(format!("unknown stage: {stage_id}")));
        };

        match self.state.usage.check_and_increment(
            self.state.tier,
            UsageKind::SingleStageGeneration,
            self.clock.as_ref(),
        ) {
            UsageDecision::Permitted => {}
            UsageDecision::Denied { source } => {
                self.state.prompt_upgrade(source);
                return Ok(None);
            }
        }

        let ctx = StageContext {
            stage_name: stage.name.clone(),
            stage_description: stage.description.clone(),
            story_context: self.story_context_for(&project, &framework, stage_id),
        };
        orchestrator
            .single_stage_suggestion(&ctx, mode, answers, instruction)
            .await
            .map(Some)
    }

    fn full_story_scope(project: &Project, framework: &Framework) -> Result<DraftScope, DomainError> {
        let filled = framework
            .stages
            .iter()
            .filter(|s| project.stage_filled(&s.id))
            .count();
        let all_filled = filled == framework.stages.len();

        if filled > 0 && !all_filled {
            return Ok(DraftScope::CompleteRemaining);
        }
        if all_filled {
            return Err(DomainError::Validation(
                "every stage already has content; edit stages individually or start a new draft"
                    .into(),
            ));
        }
        if project.has_raw_idea() {
            Ok(DraftScope::FullFromIdea)
        } else {
            Err(DomainError::Validation(
                "nothing to draft from: add a story idea or fill in a stage first".into(),
            ))
        }
    }

    /// Requests a bulk draft. The scope is computed from project state:
    /// completion when some stages are filled (preserving them), full draft
    /// from the raw idea when none are. Tier-gated before the usage counter
    /// so a FREE denial reads as a tier gate: the provider is never invoked
    /// and no counter changes. `Ok(None)` means a gate refused the request.
    ///
    /// The returned suggestion is staged for review; the bulk lock stays held
    /// until [`Self::accept_full_story`] or [`Self::dismiss_full_story`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when there is nothing to draft (or
    /// every stage is already filled), `DomainError::Provider` on generation
    /// failure.
    pub async fn request_full_story(
        &mut self,
        mode: OutputMode,
        instruction: Option<&str>,
    ) -> Result<Option<FullStorySuggestion>, DomainError> {
        let orchestrator = self.assist_or_unconfigured()?.clone();
        let Some(project) = self.state.active_project.clone() else {
            return Err(DomainError::Validation("no active project".into()));
        };
        if self.state.bulk_locked() {
            return Ok(None);
        }
        let framework = self.framework_of(&project)?.clone();
        let scope = Self::full_story_scope(&project, &framework)?;

        if !full_story_available(self.state.tier) {
            self.state.prompt_upgrade(UpgradeSource::FullStoryTierGate);
            return Ok(None);
        }
        match self.state.usage.check_and_increment(
            self.state.tier,
            UsageKind::FullStoryDraft,
            self.clock.as_ref(),
        ) {
            UsageDecision::Permitted => {}
            UsageDecision::Denied { source } => {
                self.state.prompt_upgrade(source);
                return Ok(None);
            }
        }

        self.state.generating_all = true;
        let generated = match scope {
            DraftScope::FullFromIdea => {
                let idea = project.raw_story_idea.clone().unwrap_or_default();
                orchestrator
                    .full_draft_from_idea(&framework, &idea, mode, instruction)
                    .await
            }
            DraftScope::CompleteRemaining => {
                orchestrator
                    .complete_remaining_stages(&framework, &project.stages_content, mode, instruction)
                    .await
            }
        };

        let generated = match generated {
            Ok(map) => map,
            Err(err) => {
                self.state.generating_all = false;
                return Err(err);
            }
        };

        let contents = match scope {
            DraftScope::FullFromIdea => generated,
            DraftScope::CompleteRemaining => {
                let mut merged: HashMap<String, String> = project.stages_content.clone();
                merged.extend(generated);
                merged
            }
        };

        Ok(Some(FullStorySuggestion { scope, contents }))
    }

    /// Abandons a staged bulk suggestion, releasing the bulk lock.
    pub fn dismiss_full_story(&mut self) {
        self.state.generating_all = false;
    }

    /// Applies an accepted bulk suggestion as one optimistic update, then
    /// snapshots a "Full Story Draft Applied" version. On failure the project
    /// is rolled back and both an inline error and a notice are surfaced.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from the remote write, after rollback.
    pub async fn accept_full_story(
        &mut self,
        suggestion: &FullStorySuggestion,
    ) -> Result<(), DomainError> {
        let Some(active_snapshot) = self.state.active_project.clone() else {
            self.state.generating_all = false;
            return Err(DomainError::Validation("no active project".into()));
        };

        self.state.banner_error = None;
        let now = self.clock.now();
        let mut updated = active_snapshot;
        updated.stages_content = suggestion.contents.clone();
        updated.last_modified = now;

        let patch = ProjectPatch::content(updated.stages_content.clone(), now);
        let repo = Arc::clone(&self.projects);
        let (project_id, user_id) = (updated.id, updated.user_id);
        let commit = async move {
            match repo.update(project_id, user_id, patch).await? {
                0 => Err(DomainError::NotFound(project_id)),
                _ => Ok(()),
            }
        };

        let active = self.state.active_project.as_mut().expect("checked above");
        let result = optimistic_update(active, &mut self.state.cache, updated.clone(), commit).await;
        self.state.generating_all = false;

        match result {
            Ok(()) => {
                self.snapshot_version(&updated, "Full Story Draft Applied").await;
                self.refresh_versions(project_id).await;
                self.state.notify(
                    NoticeLevel::Success,
                    format!("\"{}\" updated with AI generated full draft.", updated.name),
                );
                Ok(())
            }
            Err(err) => {
                let message = format!("Failed to save full story draft: {err}");
                self.state.banner_error = Some(message.clone());
                self.state.notify(NoticeLevel::Error, message);
                Err(err)
            }
        }
    }

    /// Reverts the active project to a version's snapshot. Revert is
    /// push-forward: the reverted state is persisted as a normal update and
    /// then snapshotted as a new version; history only grows.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the version is not in the cached
    /// list, or the remote write's error after rollback.
    pub async fn revert_to_version(&mut self, version_id: Uuid) -> Result<(), DomainError> {
        if self.state.bulk_locked() {
            return Ok(());
        }
        let Some(active_snapshot) = self.state.active_project.clone() else {
            self.state.notify(
                NoticeLevel::Error,
                "Cannot revert: No active project or user session.",
            );
            return Err(DomainError::Validation("no active project".into()));
        };
        let Some(version) = self.state.versions.iter().find(|v| v.id == version_id).cloned()
        else {
            return Err(DomainError::Validation("version not found".into()));
        };

        self.state.reverting_version = Some(version_id);
        let now = self.clock.now();
        let mut updated = active_snapshot;
        updated.stages_content = version.stages_content.clone();
        updated.raw_story_idea = version.raw_story_idea.clone();
        updated.last_modified = now;

        let patch = ProjectPatch::content(updated.stages_content.clone(), now)
            .with_raw_idea(updated.raw_story_idea.clone());
        let repo = Arc::clone(&self.projects);
        let (project_id, user_id) = (updated.id, updated.user_id);
        let commit = async move {
            match repo.update(project_id, user_id, patch).await? {
                0 => Err(DomainError::NotFound(project_id)),
                _ => Ok(()),
            }
        };

        let active = self.state.active_project.as_mut().expect("checked above");
        let result = optimistic_update(active, &mut self.state.cache, updated.clone(), commit).await;

        match result {
            Ok(()) => {
                let label = format!(
                    "Reverted to version from {}",
                    version.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                self.snapshot_version(&updated, &label).await;
                self.state.notify(
                    NoticeLevel::Success,
                    format!("Project reverted to version: \"{}\".", version.version_name),
                );
                self.refresh_versions(project_id).await;
                self.state.reverting_version = None;
                Ok(())
            }
            Err(err) => {
                self.state.reverting_version = None;
                self.state.notify(
                    NoticeLevel::Error,
                    format!("Failed to revert project: {err}"),
                );
                Err(err)
            }
        }
    }

    /// Stages a project for deletion, pending explicit confirmation.
    pub fn request_delete(&mut self, project_id: Uuid) {
        if self.state.user_id.is_none() {
            self.state
                .notify(NoticeLevel::Error, "Please log in to delete projects.");
            return;
        }
        if self.state.confirming_delete.is_some() || self.state.bulk_locked() {
            return;
        }
        let Some(project) = self.state.cache.get(project_id).cloned() else {
            self.state.notify(NoticeLevel::Error, "Project not found.");
            return;
        };
        self.state.confirming_delete = Some(project);
    }

    /// Abandons a staged deletion.
    pub fn cancel_delete(&mut self) {
        self.state.confirming_delete = None;
    }

    /// Executes a confirmed deletion. Zero rows affected means the project
    /// was already gone: the cache is reconciled by removal and a "not found"
    /// notice is shown instead of a generic error. An indeterminate count is
    /// a repository-level error and fails closed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` when the remote delete fails outright.
    pub async fn confirm_delete(&mut self) -> Result<(), DomainError> {
        let Some(project) = self.state.confirming_delete.take() else {
            return Ok(());
        };
        let Some(user_id) = self.state.user_id else {
            return Ok(());
        };

        match self.projects.delete(project.id, user_id).await {
            Ok(0) => {
                self.state.cache.remove(project.id);
                self.state.notify(
                    NoticeLevel::Info,
                    format!(
                        "\"{}\" was not found on the server or was already deleted.",
                        project.name
                    ),
                );
                if self
                    .state
                    .active_project
                    .as_ref()
                    .is_some_and(|p| p.id == project.id)
                {
                    self.reset_to_idle();
                }
                Ok(())
            }
            Ok(_) => {
                self.state.cache.remove(project.id);
                self.state.notify(
                    NoticeLevel::Success,
                    format!("\"{}\" permanently deleted.", project.name),
                );
                if self
                    .state
                    .active_project
                    .as_ref()
                    .is_some_and(|p| p.id == project.id)
                {
                    self.reset_to_idle();
                }
                Ok(())
            }
            Err(err) => {
                self.state.notify(
                    NoticeLevel::Error,
                    format!("Failed to delete \"{}\": {err}", project.name),
                );
                Err(err)
            }
        }
    }

    /// Upgrades the session to PRO: resets usage counters and clears the
    /// upgrade prompt.
    pub fn upgrade_to_pro(&mut self) {
        self.state.tier = SubscriptionTier::Pro;
        self.state.usage.reset(self.clock.as_ref());
        self.state.upgrade_prompt = None;
        self.state
            .notify(NoticeLevel::Success, "Successfully upgraded to Pro Plan!");
    }

    /// Dismisses the upgrade prompt without upgrading.
    pub fn dismiss_upgrade_prompt(&mut self) {
        self.state.upgrade_prompt = None;
    }

    /// Completes onboarding with the given profile data.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Persistence` when the upsert fails.
    pub async fn complete_onboarding(
        &mut self,
        display_name: Option<String>,
        preferred_genres: Option<Vec<String>>,
    ) -> Result<(), DomainError> {
        let Some(user_id) = self.state.user_id else {
            return Err(DomainError::Validation("no user session".into()));
        };
        let stored = self
            .profiles
            .upsert(ProfileUpsert {
                id: user_id,
                display_name,
                preferred_genres,
                onboarding_completed: true,
            })
            .await?;
        self.state.profile = Some(stored);
        self.state.onboarding_pending = false;
        self.refresh_projects(user_id).await;
        Ok(())
    }

    /// Skips onboarding, still marking it complete so it is not shown again.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Persistence` when the upsert fails.
    pub async fn skip_onboarding(&mut self) -> Result<(), DomainError> {
        let Some(user_id) = self.state.user_id else {
            return Err(DomainError::Validation("no user session".into()));
        };
        let stored = self
            .profiles
            .upsert(ProfileUpsert::onboarding_skipped(user_id))
            .await?;
        self.state.profile = Some(stored);
        self.state.onboarding_pending = false;
        self.refresh_projects(user_id).await;
        Ok(())
    }
}
