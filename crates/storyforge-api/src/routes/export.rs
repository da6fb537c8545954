//! Routes for document export.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use storyforge_core::error::DomainError;
use storyforge_export::{ExportFormat, ExportOptions, export_filename, render};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Body for POST /api/v1/projects/{id}/export.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// The owning user.
    pub user_id: Uuid,
    /// Inclusion flags.
    #[serde(default)]
    pub options: ExportOptions,
    /// Output format.
    pub format: ExportFormat,
}

/// Rendered export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    /// Suggested filename.
    pub filename: String,
    /// Rendered document.
    pub content: String,
}

/// POST /api/v1/projects/{id}/export
async fn export_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let projects = state.projects.list_by_user(body.user_id).await?;
    let Some(project) = projects.into_iter().find(|p| p.id == project_id) else {
        return Err(ApiError::Domain(DomainError::NotFound(project_id)));
    };
    let Some(framework) = state.catalog.get(&project.framework_id) else {
        return Err(ApiError::FrameworkNotFound(project.framework_id.clone()));
    };

    Ok(Json(ExportResponse {
        filename: export_filename(&project, body.format),
        content: render(&project, framework, body.options, body.format),
    }))
}

/// Returns the router for export, nested under the projects prefix.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/export", post(export_project))
}
