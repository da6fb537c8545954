//! Routes for the AI Assist context.
//!
//! These endpoints proxy the text-generation provider. Daily quota gating is
//! session-scoped and advisory, so it lives in the client session layer, not
//! here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use storyforge_assist::{AssistOrchestrator, OutputMode, QuestionAnswer, StageContext};
use storyforge_catalog::Framework;
use storyforge_core::error::DomainError;

use crate::error::ApiError;
use crate::state::AppState;

fn orchestrator(state: &AppState) -> Result<Arc<AssistOrchestrator>, ApiError> {
    state.assist.clone().ok_or(ApiError::Domain(DomainError::Validation(
        "text provider is not configured".into(),
    )))
}

fn framework(state: &AppState, framework_id: &str) -> Result<Framework, ApiError> {
    state
        .catalog
        .get(framework_id)
        .cloned()
        .ok_or_else(|| ApiError::FrameworkNotFound(framework_id.to_owned()))
}

/// Body for POST /api/v1/assist/questions.
#[derive(Debug, Deserialize)]
pub struct QuestionsRequest {
    /// Stage display name.
    pub stage_name: String,
    /// Stage description.
    pub stage_description: String,
    /// Story context assembled so far.
    #[serde(default)]
    pub story_context: String,
    /// Optional user instruction.
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Response for POST /api/v1/assist/questions.
#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    /// Generated clarifying questions.
    pub questions: Vec<String>,
}

/// POST /api/v1/assist/questions
async fn clarifying_questions(
    State(state): State<AppState>,
    Json(body): Json<QuestionsRequest>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let orchestrator = orchestrator(&state)?;
    let ctx = StageContext {
        stage_name: body.stage_name,
        stage_description: body.stage_description,
        story_context: body.story_context,
    };
    let questions = orchestrator
        .clarifying_questions(&ctx, body.instruction.as_deref())
        .await?;
    Ok(Json(QuestionsResponse { questions }))
}

/// Body for POST /api/v1/assist/stage.
#[derive(Debug, Deserialize)]
pub struct StageSuggestionRequest {
    /// Stage display name.
    pub stage_name: String,
    /// Stage description.
    pub stage_description: String,
    /// Story context assembled so far.
    #[serde(default)]
    pub story_context: String,
    /// Output mode.
    pub mode: OutputMode,
    /// Answered clarifying questions.
    #[serde(default)]
    pub answers: Vec<QuestionAnswer>,
    /// Optional user instruction.
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Response for POST /api/v1/assist/stage.
#[derive(Debug, Serialize)]
pub struct StageSuggestionResponse {
    /// Generated suggestion text.
    pub text: String,
}

/// POST /api/v1/assist/stage
async fn stage_suggestion(
    State(state): State<AppState>,
    Json(body): Json<StageSuggestionRequest>,
) -> Result<Json<StageSuggestionResponse>, ApiError> {
    let orchestrator = orchestrator(&state)?;
    let ctx = StageContext {
        stage_name: body.stage_name,
        stage_description: body.stage_description,
        story_context: body.story_context,
    };
    let text = orchestrator
        .single_stage_suggestion(&ctx, body.mode, &body.answers, body.instruction.as_deref())
        .await?;
    Ok(Json(StageSuggestionResponse { text }))
}

/// Body for POST /api/v1/assist/full-draft.
#[derive(Debug, Deserialize)]
pub struct FullDraftRequest {
    /// Target framework.
    pub framework_id: String,
    /// The raw story idea.
    pub raw_idea: String,
    /// Output mode.
    pub mode: OutputMode,
    /// Optional user instruction.
    #[serde(default)]
    pub instruction: Option<String>,
}

/// POST /api/v1/assist/full-draft
async fn full_draft(
    State(state): State<AppState>,
    Json(body): Json<FullDraftRequest>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let orchestrator = orchestrator(&state)?;
    let framework = framework(&state, &body.framework_id)?;
    let draft = orchestrator
        .full_draft_from_idea(&framework, &body.raw_idea, body.mode, body.instruction.as_deref())
        .await?;
    Ok(Json(draft))
}

/// Body for POST /api/v1/assist/complete.
#[derive(Debug, Deserialize)]
pub struct CompleteRemainingRequest {
    /// Target framework.
    pub framework_id: String,
    /// Current per-stage content.
    #[serde(default)]
    pub existing_content: HashMap<String, String>,
    /// Output mode.
    pub mode: OutputMode,
    /// Optional user instruction.
    #[serde(default)]
    pub instruction: Option<String>,
}

/// POST /api/v1/assist/complete
async fn complete_remaining(
    State(state): State<AppState>,
    Json(body): Json<CompleteRemainingRequest>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let orchestrator = orchestrator(&state)?;
    let framework = framework(&state, &body.framework_id)?;
    let completed = orchestrator
        .complete_remaining_stages(
            &framework,
            &body.existing_content,
            body.mode,
            body.instruction.as_deref(),
        )
        .await?;
    Ok(Json(completed))
}

/// Body for POST /api/v1/assist/map-idea.
#[derive(Debug, Deserialize)]
pub struct MapIdeaRequest {
    /// Target framework.
    pub framework_id: String,
    /// The raw story idea.
    pub raw_idea: String,
}

/// POST /api/v1/assist/map-idea
async fn map_idea(
    State(state): State<AppState>,
    Json(body): Json<MapIdeaRequest>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    let orchestrator = orchestrator(&state)?;
    let framework = framework(&state, &body.framework_id)?;
    let mapped = orchestrator
        .map_idea_to_framework(&body.raw_idea, &framework)
        .await?;
    Ok(Json(mapped))
}

/// Returns the router for the assist context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", post(clarifying_questions))
        .route("/stage", post(stage_suggestion))
        .route("/full-draft", post(full_draft))
        .route("/complete", post(complete_remaining))
        .route("/map-idea", post(map_idea))
}
