//! PostgreSQL implementation of `ProfileRepository`.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use storyforge_core::error::DomainError;
use storyforge_profiles::{ProfileRepository, ProfileUpsert, UserProfile};
use uuid::Uuid;

use crate::persistence;

const PROFILE_COLUMNS: &str =
    "id, display_name, preferred_genres, onboarding_completed, created_at, updated_at";

/// PostgreSQL-backed profile repository.
#[derive(Debug, Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Creates a new repository over the pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, DomainError> {
    Ok(UserProfile {
        id: row.try_get("id").map_err(persistence)?,
        display_name: row.try_get("display_name").map_err(persistence)?,
        preferred_genres: row.try_get("preferred_genres").map_err(persistence)?,
        onboarding_completed: row.try_get("onboarding_completed").map_err(persistence)?,
        created_at: row.try_get("created_at").map_err(persistence)?,
        updated_at: row.try_get("updated_at").map_err(persistence)?,
    })
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn upsert(&self, profile: ProfileUpsert) -> Result<UserProfile, DomainError> {
        let sql = format!(
            "INSERT INTO user_profiles (id, display_name, preferred_genres, onboarding_completed)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                 display_name = EXCLUDED.display_name,
                 preferred_genres = EXCLUDED.preferred_genres,
                 onboarding_completed = EXCLUDED.onboarding_completed,
                 updated_at = NOW()
             RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(profile.id)
            .bind(&profile.display_name)
            .bind(&profile.preferred_genres)
            .bind(profile.onboarding_completed)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)?;
        profile_from_row(&row)
    }
}
