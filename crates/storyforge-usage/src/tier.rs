//! Subscription tiers and the capability table.
//!
//! Every tier/feature gate in the system routes through [`capability`] so the
//! quota table cannot drift between call sites.

use serde::{Deserialize, Serialize};

/// Subscription tier, determining quotas and feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Free plan.
    Free,
    /// Paid plan.
    Pro,
}

/// A gated capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Per-day single-stage AI generations.
    SingleStageGenerations,
    /// Per-day clarifying-question generations.
    ClarifyingQuestions,
    /// Per-day full-story drafts (any mode of bulk generation).
    FullStoryDrafts,
    /// Concurrently held projects.
    ConcurrentProjects,
}

/// A capability limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many.
    Finite(u32),
    /// No cap.
    Unlimited,
}

impl Limit {
    /// Returns true if one more use is permitted given `used` so far.
    #[must_use]
    pub fn permits(self, used: u32) -> bool {
        match self {
            Self::Finite(cap) => used < cap,
            Self::Unlimited => true,
        }
    }
}

/// Looks up the limit for a `(tier, capability)` pair.
#[must_use]
pub fn capability(tier: SubscriptionTier, capability: Capability) -> Limit {
    use Capability::{ClarifyingQuestions, ConcurrentProjects, FullStoryDrafts, SingleStageGenerations};

    match (tier, capability) {
        (SubscriptionTier::Free, SingleStageGenerations) => Limit::Finite(5),
        (SubscriptionTier::Free, ClarifyingQuestions) => Limit::Finite(3),
        (SubscriptionTier::Free, FullStoryDrafts) => Limit::Finite(0),
        (SubscriptionTier::Free, ConcurrentProjects) => Limit::Finite(3),
        (SubscriptionTier::Pro, SingleStageGenerations) => Limit::Finite(100),
        (SubscriptionTier::Pro, ClarifyingQuestions) => Limit::Finite(50),
        (SubscriptionTier::Pro, FullStoryDrafts) => Limit::Finite(10),
        (SubscriptionTier::Pro, ConcurrentProjects) => Limit::Unlimited,
    }
}

/// Returns true if full-story drafting is available on `tier` at all.
///
/// A zero quota means the feature is categorically unavailable; callers check
/// this before touching the usage counters so the upgrade prompt reads as a
/// tier gate rather than quota exhaustion.
#[must_use]
pub fn full_story_available(tier: SubscriptionTier) -> bool {
    capability(tier, Capability::FullStoryDrafts) != Limit::Finite(0)
}

/// Returns true if a user on `tier` holding `current_count` projects may
/// create another.
#[must_use]
pub fn can_create_project(tier: SubscriptionTier, current_count: usize) -> bool {
    let used = u32::try_from(current_count).unwrap_or(u32::MAX);
    capability(tier, Capability::ConcurrentProjects).permits(used)
}
