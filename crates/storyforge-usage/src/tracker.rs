//! Daily AI usage tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use storyforge_core::clock::Clock;

use crate::tier::{Capability, SubscriptionTier, capability};

/// The three AI action kinds tracked against daily quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// One single-stage generation, in any output mode.
    SingleStageGeneration,
    /// One clarifying-questions generation.
    ClarifyingQuestion,
    /// One full-story draft, in any mode of bulk generation.
    FullStoryDraft,
}

impl UsageKind {
    fn capability(self) -> Capability {
        match self {
            Self::SingleStageGeneration => Capability::SingleStageGenerations,
            Self::ClarifyingQuestion => Capability::ClarifyingQuestions,
            Self::FullStoryDraft => Capability::FullStoryDrafts,
        }
    }
}

/// Where an upgrade prompt originated, carried as a source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeSource {
    /// A daily quota for the given kind ran out.
    QuotaExhausted(UsageKind),
    /// Full-story drafting is categorically unavailable on the current tier.
    FullStoryTierGate,
    /// The concurrent-project cap was reached.
    ProjectLimit,
}

impl UpgradeSource {
    /// The source tag attached to the upgrade prompt.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::QuotaExhausted(UsageKind::SingleStageGeneration) => {
                "ai_limit_single_stage_generations"
            }
            Self::QuotaExhausted(UsageKind::ClarifyingQuestion) => "ai_limit_clarifying_questions",
            Self::QuotaExhausted(UsageKind::FullStoryDraft) => "ai_limit_full_story_drafts",
            Self::FullStoryTierGate => "full_story_tier",
            Self::ProjectLimit => "project_limit",
        }
    }
}

/// Outcome of a usage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDecision {
    /// The action is permitted; the counter was incremented.
    Permitted,
    /// The action is denied; counters are untouched and an upgrade prompt
    /// should be shown with the given source.
    Denied {
        /// Origin of the denial.
        source: UpgradeSource,
    },
}

impl UsageDecision {
    /// Returns true for `Permitted`.
    #[must_use]
    pub fn is_permitted(self) -> bool {
        matches!(self, Self::Permitted)
    }
}

/// Session-scoped daily usage counters.
///
/// Counts are valid only for `last_reset_date == today`; the first check of a
/// new day pays the rollover reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiUsageState {
    single_stage_generations: u32,
    clarifying_questions: u32,
    full_story_drafts: u32,
    last_reset_date: NaiveDate,
}

impl AiUsageState {
    /// Fresh state anchored to today.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            single_stage_generations: 0,
            clarifying_questions: 0,
            full_story_drafts: 0,
            last_reset_date: clock.today(),
        }
    }

    /// Current count for a kind (after any pending rollover, it would read
    /// zero; this accessor reports the stored value).
    #[must_use]
    pub fn count(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::SingleStageGeneration => self.single_stage_generations,
            UsageKind::ClarifyingQuestion => self.clarifying_questions,
            UsageKind::FullStoryDraft => self.full_story_drafts,
        }
    }

    /// The day the counters were last reset.
    #[must_use]
    pub fn last_reset_date(&self) -> NaiveDate {
        self.last_reset_date
    }

    /// Zeroes all counters and re-anchors to today. Called on logout and on
    /// tier upgrade.
    pub fn reset(&mut self, clock: &dyn Clock) {
        *self = Self::new(clock);
    }

    fn count_mut(&mut self, kind: UsageKind) -> &mut u32 {
        match kind {
            UsageKind::SingleStageGeneration => &mut self.single_stage_generations,
            UsageKind::ClarifyingQuestion => &mut self.clarifying_questions,
            UsageKind::FullStoryDraft => &mut self.full_story_drafts,
        }
    }

    /// Authorizes one action of `kind` under `tier`.
    ///
    /// If the stored reset date is stale, all counters are zeroed first. On
    /// permit the counter is incremented; on denial nothing changes and the
    /// decision carries the upgrade-prompt source tag.
    pub fn check_and_increment(
        &mut self,
        tier: SubscriptionTier,
        kind: UsageKind,
        clock: &dyn Clock,
    ) -> UsageDecision {
        let today = clock.today();
        if self.last_reset_date != today {
            tracing::debug!(%today, "rolling over daily usage counters");
            self.reset(clock);
        }

        let limit = capability(tier, kind.capability());
        if limit.permits(self.count(kind)) {
            *self.count_mut(kind) += 1;
            UsageDecision::Permitted
        } else {
            UsageDecision::Denied {
                source: UpgradeSource::QuotaExhausted(kind),
            }
        }
    }
}
