//! Routes for the Project context.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyforge_core::error::DomainError;
use storyforge_projects::{Project, ProjectDraft, ProjectPatch};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Owner scoping for reads and deletes.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    /// The owning user.
    pub user_id: Uuid,
}

/// Body for POST /api/v1/projects.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Framework id.
    pub framework_id: String,
    /// Initial per-stage content.
    #[serde(default)]
    pub stages_content: HashMap<String, String>,
    /// The raw idea, if any.
    #[serde(default)]
    pub raw_story_idea: Option<String>,
}

/// Body for PATCH /api/v1/projects/{id}.
///
/// `clear_raw_story_idea` removes the stored idea; otherwise a present
/// `raw_story_idea` replaces it and an absent one leaves it untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// The owning user.
    pub user_id: Uuid,
    /// Replacement stage content, if changed.
    #[serde(default)]
    pub stages_content: Option<HashMap<String, String>>,
    /// Replacement raw idea.
    #[serde(default)]
    pub raw_story_idea: Option<String>,
    /// Clears the raw idea.
    #[serde(default)]
    pub clear_raw_story_idea: bool,
    /// Client-supplied last-modified timestamp; server time when absent.
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Affected-count response for writes.
#[derive(Debug, Serialize)]
pub struct AffectedResponse {
    /// Definite number of rows affected.
    pub affected: u64,
}

fn check_stage_keys(
    state: &AppState,
    framework_id: &str,
    stages_content: &HashMap<String, String>,
) -> Result<(), ApiError> {
    let Some(framework) = state.catalog.get(framework_id) else {
        return Err(ApiError::FrameworkNotFound(framework_id.to_owned()));
    };
    for key in stages_content.keys() {
        if !framework.has_stage(key) {
            return Err(ApiError::Domain(DomainError::Validation(format!(
                "stage {key} does not belong to framework {framework_id}"
            ))));
        }
    }
    Ok(())
}

/// POST /api/v1/projects
async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    check_stage_keys(&state, &body.framework_id, &body.stages_content)?;

    let created = state
        .projects
        .insert(ProjectDraft {
            user_id: body.user_id,
            name: body.name,
            framework_id: body.framework_id,
            stages_content: body.stages_content,
            raw_story_idea: body.raw_story_idea,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects?user_id=
async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.projects.list_by_user(query.user_id).await?;
    Ok(Json(projects))
}

/// PATCH /api/v1/projects/{id}
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<AffectedResponse>, ApiError> {
    let raw_story_idea = if body.clear_raw_story_idea {
        Some(None)
    } else {
        body.raw_story_idea.map(Some)
    };
    let patch = ProjectPatch {
        stages_content: body.stages_content,
        raw_story_idea,
        last_modified: body.last_modified.unwrap_or_else(|| state.clock.now()),
    };

    let affected = state.projects.update(id, body.user_id, patch).await?;
    if affected == 0 {
        return Err(ApiError::Domain(DomainError::NotFound(id)));
    }
    Ok(Json(AffectedResponse { affected }))
}

/// DELETE /api/v1/projects/{id}?user_id=
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<AffectedResponse>, ApiError> {
    let affected = state.projects.delete(id, query.user_id).await?;
    if affected == 0 {
        // Already gone: the client reconciles by removal.
        return Err(ApiError::Domain(DomainError::NotFound(id)));
    }
    Ok(Json(AffectedResponse { affected }))
}

/// Returns the router for the project context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{id}",
            axum::routing::patch(update_project).delete(delete_project),
        )
}
