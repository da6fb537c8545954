//! StoryForge — User Profile context.
//!
//! A profile is created or upserted on first login or onboarding completion
//! and read once per session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyforge_core::error::DomainError;
use uuid::Uuid;

/// A user profile row, keyed by the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user id.
    pub id: Uuid,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional preferred genres.
    pub preferred_genres: Option<Vec<String>>,
    /// Whether onboarding has been completed (or explicitly skipped).
    pub onboarding_completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields for an upsert; timestamps are server-maintained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpsert {
    /// The user id.
    pub id: Uuid,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional preferred genres.
    pub preferred_genres: Option<Vec<String>>,
    /// Whether onboarding has been completed.
    pub onboarding_completed: bool,
}

impl ProfileUpsert {
    /// The minimal upsert that marks onboarding done for a user who skipped
    /// the flow before entering any data.
    #[must_use]
    pub fn onboarding_skipped(user_id: Uuid) -> Self {
        Self {
            id: user_id,
            display_name: None,
            preferred_genres: None,
            onboarding_completed: true,
        }
    }
}

/// Repository contract for profile rows.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetches a profile; `None` means the user has not onboarded yet.
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError>;

    /// Inserts or updates a profile and returns the stored row.
    async fn upsert(&self, profile: ProfileUpsert) -> Result<UserProfile, DomainError>;
}
