//! StoryForge API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use storyforge_api::{routes, state::AppState};
use storyforge_assist::AssistOrchestrator;
use storyforge_catalog::Catalog;
use storyforge_core::clock::SystemClock;
use storyforge_gemini::{DEFAULT_MODEL, GeminiClient};
use storyforge_store::{PgProfileRepository, PgProjectRepository, PgVersionRepository};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

fn build_router(app_state: AppState) -> Router {
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
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting StoryForge API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    // Text-generation provider is optional: without a key, assist endpoints
    // report an unconfigured provider instead of failing at startup.
    let assist = match std::env::var("GEMINI_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            let model =
                std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
            let provider = Arc::new(GeminiClient::new(api_key, model));
            Some(Arc::new(AssistOrchestrator::new(provider)))
        }
        _ => {
            tracing::warn!("GEMINI_API_KEY not set; AI assist endpoints are disabled");
            None
        }
    };

    // Build application state.
    let app_state = AppState::new(
        Arc::new(Catalog::builtin()?),
        Arc::new(SystemClock),
        Arc::new(PgProjectRepository::new(pool.clone())),
        Arc::new(PgVersionRepository::new(pool.clone())),
        Arc::new(PgProfileRepository::new(pool)),
        assist,
    );

    // Build router.
    let app = build_router(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
