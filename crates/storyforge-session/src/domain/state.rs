//! Session state.
//!
//! One explicit struct instead of ambient globals; every controller handler
//! receives it through `&mut self`. Conflicting bulk operations are gated by
//! the in-flight flags here — a second request while one is pending is
//! refused, never queued.

use std::collections::HashMap;

use storyforge_core::clock::Clock;
use storyforge_profiles::UserProfile;
use storyforge_projects::{Project, ProjectCache};
use storyforge_usage::{AiUsageState, SubscriptionTier, UpgradeSource};
use storyforge_versions::ProjectVersion;
use uuid::Uuid;

/// Device-storage key for the unsaved idea draft.
pub const IDEA_DRAFT_KEY: &str = "storyforge_raw_idea";

/// Device-storage key for a user's last active project.
#[must_use]
pub fn last_active_key(user_id: Uuid) -> String {
    format!("last_active_project_id_{user_id}")
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Informational.
    Info,
}

/// A transient notification queued for the UI to drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable message.
    pub message: String,
}

/// Mapped content held between framework selection and title submission;
/// no project row exists yet.
#[derive(Debug, Clone)]
pub struct PendingProject {
    /// The selected framework.
    pub framework_id: String,
    /// Stage content mapped from the idea (or all-empty).
    pub stages_content: HashMap<String, String>,
    /// The raw idea, if one was entered.
    pub raw_story_idea: Option<String>,
}

/// Which bulk generation path produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftScope {
    /// Every stage drafted from the raw idea.
    FullFromIdea,
    /// Only the previously-empty stages were generated.
    CompleteRemaining,
}

/// A bulk suggestion staged for user review.
///
/// `contents` is the complete post-accept stage mapping: for completion mode
/// the generated stages are already merged over the preserved existing text.
#[derive(Debug, Clone)]
pub struct FullStorySuggestion {
    /// How the suggestion was produced.
    pub scope: DraftScope,
    /// The full stage mapping to apply on accept.
    pub contents: HashMap<String, String>,
}

/// All session-scoped state.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The logged-in user, if any.
    pub user_id: Option<Uuid>,
    /// The user's profile, once fetched.
    pub profile: Option<UserProfile>,
    /// True when onboarding must be shown before normal use.
    pub onboarding_pending: bool,
    /// Subscription tier.
    pub tier: SubscriptionTier,
    /// Daily AI usage counters.
    pub usage: AiUsageState,
    /// The idea-entry buffer (pre-project).
    pub raw_idea: String,
    /// The framework selected for the active or pending project.
    pub selected_framework_id: Option<String>,
    /// Mapped content awaiting a title.
    pub pending_project: Option<PendingProject>,
    /// True between framework selection and title submission.
    pub awaiting_title: bool,
    /// The single active project, if any.
    pub active_project: Option<Project>,
    /// Cached project list, newest `last_modified` first.
    pub cache: ProjectCache,
    /// Cached version list for the active project, newest first.
    pub versions: Vec<ProjectVersion>,
    /// A bulk generation or its review/apply is in flight.
    pub generating_all: bool,
    /// A version revert is in flight.
    pub reverting_version: Option<Uuid>,
    /// Deletion awaiting confirmation.
    pub confirming_delete: Option<Project>,
    /// Inline error banner.
    pub banner_error: Option<String>,
    /// Pending upgrade prompt, with its source tag.
    pub upgrade_prompt: Option<UpgradeSource>,
    /// Queued transient notices.
    pub notices: Vec<Notice>,
}

impl SessionState {
    /// Fresh logged-out state.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            user_id: None,
            profile: None,
            onboarding_pending: false,
            tier: SubscriptionTier::Free,
            usage: AiUsageState::new(clock),
            raw_idea: String::new(),
            selected_framework_id: None,
            pending_project: None,
            awaiting_title: false,
            active_project: None,
            cache: ProjectCache::new(),
            versions: Vec::new(),
            generating_all: false,
            reverting_version: None,
            confirming_delete: None,
            banner_error: None,
            upgrade_prompt: None,
            notices: Vec::new(),
        }
    }

    /// True while a bulk generation or a revert holds the project: per-stage
    /// edits and further bulk operations are refused.
    #[must_use]
    pub fn bulk_locked(&self) -> bool {
        self.generating_all || self.reverting_version.is_some()
    }

    /// Queues a notice.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Drains queued notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Raises the upgrade prompt.
    pub fn prompt_upgrade(&mut self, source: UpgradeSource) {
        self.upgrade_prompt = Some(source);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use storyforge_test_support::FixedClock;

    use super::*;

    #[test]
    fn test_fresh_state_is_idle_and_free_tier() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let state = SessionState::new(&clock);

        assert!(state.user_id.is_none());
        assert_eq!(state.tier, SubscriptionTier::Free);
        assert!(!state.bulk_locked());
        assert!(state.cache.is_empty());
        assert!(state.notices.is_empty());
    }

    #[test]
    fn test_bulk_lock_covers_generation_and_revert() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let mut state = SessionState::new(&clock);

        state.generating_all = true;
        assert!(state.bulk_locked());

        state.generating_all = false;
        state.reverting_version = Some(Uuid::new_v4());
        assert!(state.bulk_locked());
    }

    #[test]
    fn test_notices_drain_once() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let mut state = SessionState::new(&clock);

        state.notify(NoticeLevel::Success, "saved");
        state.notify(NoticeLevel::Error, "failed");

        let drained = state.take_notices();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NoticeLevel::Success);
        assert!(state.take_notices().is_empty());
    }
}
