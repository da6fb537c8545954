//! Integration tests for the profile endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_profile_is_404_then_upsert_round_trips(pool: PgPool) {
    let user_id = Uuid::new_v4();

    let (status, _) = common::get_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/profiles/{user_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stored) = common::put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/profiles/{user_id}"),
        &json!({
            "display_name": "Quinn",
            "preferred_genres": ["fantasy", "noir"],
            "onboarding_completed": true,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["onboarding_completed"], true);

    let (status, fetched) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/v1/profiles/{user_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["display_name"], "Quinn");
    assert_eq!(fetched["preferred_genres"], json!(["fantasy", "noir"]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_onboarding_skip_upserts_minimal_profile(pool: PgPool) {
    let user_id = Uuid::new_v4();

    let (status, stored) = common::put_json(
        common::build_test_app(pool),
        &format!("/api/v1/profiles/{user_id}"),
        &json!({"onboarding_completed": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["onboarding_completed"], true);
    assert!(stored["display_name"].is_null());
}
