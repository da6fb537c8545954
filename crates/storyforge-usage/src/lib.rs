//! StoryForge — Usage & Tier context.
//!
//! Tracks per-day counts against tier-based quotas for the three AI action
//! kinds, and routes every tier/feature gate through one capability table.
//! Usage state is session-scoped and advisory: it resets on logout and on
//! tier upgrade, and has no server mirror.

mod tier;
mod tracker;

pub use tier::{Capability, Limit, SubscriptionTier, can_create_project, capability, full_story_available};
pub use tracker::{AiUsageState, UpgradeSource, UsageDecision, UsageKind};
