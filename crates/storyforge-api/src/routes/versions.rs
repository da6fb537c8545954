//! Routes for the Version History context.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use storyforge_core::error::DomainError;
use storyforge_versions::ProjectVersion;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::projects::OwnerQuery;
use crate::state::AppState;

/// Body for POST /api/v1/projects/{id}/versions.
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    /// The owning user.
    pub user_id: Uuid,
    /// Human-readable version label.
    pub label: String,
}

/// POST /api/v1/projects/{id}/versions: snapshot current content and trim.
async fn snapshot_version(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<SnapshotRequest>,
) -> Result<(StatusCode, Json<ProjectVersion>), ApiError> {
    let projects = state.projects.list_by_user(body.user_id).await?;
    let Some(project) = projects.into_iter().find(|p| p.id == project_id) else {
        return Err(ApiError::Domain(DomainError::NotFound(project_id)));
    };

    let created = state.versions.snapshot(&project, &body.label).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects/{id}/versions?user_id=
async fn list_versions(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ProjectVersion>>, ApiError> {
    let versions = state.versions.list_versions(project_id, query.user_id).await?;
    Ok(Json(versions))
}

/// Returns the router for the version context, nested under the projects
/// prefix.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/versions", get(list_versions).post(snapshot_version))
}
