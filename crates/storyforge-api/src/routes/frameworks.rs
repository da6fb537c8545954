//! Routes for the Framework Catalog context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use storyforge_catalog::Framework;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/frameworks
async fn list_frameworks(State(state): State<AppState>) -> Json<Vec<Framework>> {
    Json(state.catalog.all().to_vec())
}

/// GET /api/v1/frameworks/{id}
async fn get_framework(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Framework>, ApiError> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::FrameworkNotFound(id))
}

/// Returns the router for the catalog context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_frameworks))
        .route("/{id}", get(get_framework))
}
