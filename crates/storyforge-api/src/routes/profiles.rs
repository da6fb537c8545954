//! Routes for the User Profile context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use storyforge_core::error::DomainError;
use storyforge_profiles::{ProfileUpsert, UserProfile};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Body for PUT /api/v1/profiles/{user_id}.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional preferred genres.
    #[serde(default)]
    pub preferred_genres: Option<Vec<String>>,
    /// Whether onboarding is complete.
    pub onboarding_completed: bool,
}

/// GET /api/v1/profiles/{user_id}
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .profiles
        .fetch(user_id)
        .await?
        .map(Json)
        .ok_or(ApiError::Domain(DomainError::NotFound(user_id)))
}

/// PUT /api/v1/profiles/{user_id}
async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpsertProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let stored = state
        .profiles
        .upsert(ProfileUpsert {
            id: user_id,
            display_name: body.display_name,
            preferred_genres: body.preferred_genres,
            onboarding_completed: body.onboarding_completed,
        })
        .await?;
    Ok(Json(stored))
}

/// Returns the router for the profile context.
pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", get(get_profile).put(upsert_profile))
}
