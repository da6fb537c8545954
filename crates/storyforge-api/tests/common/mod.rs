//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use storyforge_api::routes;
use storyforge_api::state::AppState;
use storyforge_assist::AssistOrchestrator;
use storyforge_catalog::Catalog;
use storyforge_core::clock::Clock;
use storyforge_store::{PgProfileRepository, PgProjectRepository, PgVersionRepository};
use storyforge_test_support::{FixedClock, ScriptedTextGenerator};
use tower::ServiceExt;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 3, 1, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over real PostgreSQL repositories with no text
/// provider configured. Uses the same route structure as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, None)
}

/// Build the full app router with a scripted text provider for assist tests.
pub fn build_test_app_with_provider(pool: PgPool, provider: Arc<ScriptedTextGenerator>) -> Router {
    build_app(pool, Some(Arc::new(AssistOrchestrator::new(provider))))
}

fn build_app(pool: PgPool, assist: Option<Arc<AssistOrchestrator>>) -> Router {
    let app_state = AppState::new(
        Arc::new(Catalog::builtin().unwrap()),
        fixed_clock(),
        Arc::new(PgProjectRepository::new(pool.clone())),
        Arc::new(PgVersionRepository::new(pool.clone())),
        Arc::new(PgProfileRepository::new(pool)),
        assist,
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/frameworks", routes::frameworks::router())
        .nest(
            "/api/v1/projects",
            routes::projects::router()
                .merge(routes::versions::router())
                .merge(routes::export::router()),
        )
        .nest("/api/v1/profiles", routes::profiles::router())
        .nest("/api/v1/assist", routes::assist::router())
        .with_state(app_state)
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = if let Some(body) = body {
        builder = builder.header("content-type", "application/json");
        builder
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Send a PATCH request with a JSON body and return the response.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PATCH", uri, Some(body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(body)).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, None).await
}
