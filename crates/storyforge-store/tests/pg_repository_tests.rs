//! Integration tests for the PostgreSQL repositories.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use storyforge_profiles::{ProfileRepository, ProfileUpsert};
use storyforge_projects::{Project, ProjectDraft, ProjectPatch, ProjectRepository};
use storyforge_store::{PgProfileRepository, PgProjectRepository, PgVersionRepository};
use storyforge_versions::{NewVersion, VersionRepository};
use uuid::Uuid;

fn make_draft(user_id: Uuid, name: &str) -> ProjectDraft {
    ProjectDraft {
        user_id,
        name: name.to_owned(),
        framework_id: "storyCircle".to_owned(),
        stages_content: HashMap::from([("you".to_owned(), "A quiet village.".to_owned())]),
        raw_story_idea: Some("a blacksmith and a dragon".to_owned()),
    }
}

fn make_version(project: &Project, label: &str) -> NewVersion {
    NewVersion {
        project_id: project.id,
        user_id: project.user_id,
        stages_content: project.stages_content.clone(),
        raw_story_idea: project.raw_story_idea.clone(),
        version_name: label.to_owned(),
    }
}

// --- projects ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_insert_assigns_id_and_timestamps_and_round_trips_content(pool: PgPool) {
    let repo = PgProjectRepository::new(pool);
    let user_id = Uuid::new_v4();

    let created = repo.insert(make_draft(user_id, "Forge & Flame")).await.unwrap();

    assert_eq!(created.user_id, user_id);
    assert_eq!(created.name, "Forge & Flame");
    assert_eq!(created.stage_content("you"), "A quiet village.");
    assert_eq!(created.raw_story_idea.as_deref(), Some("a blacksmith and a dragon"));
    assert_eq!(created.last_modified, created.created_at);

    let listed = repo.list_by_user(user_id).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_by_user_orders_newest_first_and_isolates_owners(pool: PgPool) {
    let repo = PgProjectRepository::new(pool);
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let first = repo.insert(make_draft(user_a, "First")).await.unwrap();
    let second = repo.insert(make_draft(user_a, "Second")).await.unwrap();
    repo.insert(make_draft(user_b, "Other owner")).await.unwrap();

    // Touch the first project so it becomes the most recently modified.
    let touched_at = Utc::now() + Duration::minutes(5);
    let affected = repo
        .update(
            first.id,
            user_a,
            ProjectPatch::content(first.stages_content.clone(), touched_at),
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let listed = repo.list_by_user(user_a).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_patches_content_and_respects_ownership(pool: PgPool) {
    let repo = PgProjectRepository::new(pool);
    let user_id = Uuid::new_v4();
    let created = repo.insert(make_draft(user_id, "Draft")).await.unwrap();

    let new_content = HashMap::from([("you".to_owned(), "Rewritten.".to_owned())]);
    let affected = repo
        .update(
            created.id,
            user_id,
            ProjectPatch::content(new_content.clone(), Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let stored = &repo.list_by_user(user_id).await.unwrap()[0];
    assert_eq!(stored.stages_content, new_content);

    // A different owner affects zero rows and changes nothing.
    let foreign = repo
        .update(
            created.id,
            Uuid::new_v4(),
            ProjectPatch::content(HashMap::new(), Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(foreign, 0);
    assert_eq!(
        repo.list_by_user(user_id).await.unwrap()[0].stages_content,
        new_content
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_can_replace_and_clear_raw_idea(pool: PgPool) {
    let repo = PgProjectRepository::new(pool);
    let user_id = Uuid::new_v4();
    let created = repo.insert(make_draft(user_id, "Draft")).await.unwrap();

    // Content-only patch leaves the raw idea untouched.
    repo.update(
        created.id,
        user_id,
        ProjectPatch::content(created.stages_content.clone(), Utc::now()),
    )
    .await
    .unwrap();
    assert!(repo.list_by_user(user_id).await.unwrap()[0].raw_story_idea.is_some());

    // An explicit clear removes it.
    repo.update(
        created.id,
        user_id,
        ProjectPatch::content(created.stages_content.clone(), Utc::now()).with_raw_idea(None),
    )
    .await
    .unwrap();
    assert!(repo.list_by_user(user_id).await.unwrap()[0].raw_story_idea.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_reports_affected_count(pool: PgPool) {
    let repo = PgProjectRepository::new(pool);
    let user_id = Uuid::new_v4();
    let created = repo.insert(make_draft(user_id, "Doomed")).await.unwrap();

    assert_eq!(repo.delete(created.id, user_id).await.unwrap(), 1);
    // Already gone: zero rows, not an error.
    assert_eq!(repo.delete(created.id, user_id).await.unwrap(), 0);
}

// --- versions ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_version_insert_and_owner_filtered_listing(pool: PgPool) {
    let projects = PgProjectRepository::new(pool.clone());
    let versions = PgVersionRepository::new(pool);
    let user_id = Uuid::new_v4();
    let project = projects.insert(make_draft(user_id, "Draft")).await.unwrap();

    for label in ["Project Created", "Stage: 'YOU' Updated", "Full Story Draft Applied"] {
        versions.insert(make_version(&project, label)).await.unwrap();
    }

    let listed = versions
        .list_for_project(project.id, user_id, 15)
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].version_name, "Full Story Draft Applied");
    assert_eq!(listed[2].version_name, "Project Created");

    // Capped listing returns only the newest.
    let capped = versions
        .list_for_project(project.id, user_id, 2)
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].version_name, "Full Story Draft Applied");

    // A different user sees nothing.
    let foreign = versions
        .list_for_project(project.id, Uuid::new_v4(), 15)
        .await
        .unwrap();
    assert!(foreign.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_version_ids_newest_first_and_batch_delete(pool: PgPool) {
    let projects = PgProjectRepository::new(pool.clone());
    let versions = PgVersionRepository::new(pool);
    let user_id = Uuid::new_v4();
    let project = projects.insert(make_draft(user_id, "Draft")).await.unwrap();

    let mut inserted = Vec::new();
    for i in 0..5 {
        inserted.push(
            versions
                .insert(make_version(&project, &format!("Snapshot {i}")))
                .await
                .unwrap(),
        );
    }

    let ids = versions.list_ids_newest_first(project.id).await.unwrap();
    assert_eq!(ids.len(), 5);
    assert_eq!(ids[0], inserted[4].id);

    // Trim everything beyond the newest two, as the version store does.
    let deleted = versions.delete_by_ids(&ids[2..]).await.unwrap();
    assert_eq!(deleted, 3);
    assert_eq!(versions.list_ids_newest_first(project.id).await.unwrap().len(), 2);

    // An empty batch is a no-op.
    assert_eq!(versions.delete_by_ids(&[]).await.unwrap(), 0);
}

// --- profiles ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_profile_fetch_absent_then_upsert_round_trip(pool: PgPool) {
    let repo = PgProfileRepository::new(pool);
    let user_id = Uuid::new_v4();

    assert!(repo.fetch(user_id).await.unwrap().is_none());

    let stored = repo
        .upsert(ProfileUpsert {
            id: user_id,
            display_name: Some("Quinn".to_owned()),
            preferred_genres: Some(vec!["fantasy".to_owned(), "noir".to_owned()]),
            onboarding_completed: true,
        })
        .await
        .unwrap();
    assert!(stored.onboarding_completed);

    let fetched = repo.fetch(user_id).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(
        fetched.preferred_genres.as_deref(),
        Some(["fantasy".to_owned(), "noir".to_owned()].as_slice())
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_profile_upsert_updates_in_place(pool: PgPool) {
    let repo = PgProfileRepository::new(pool);
    let user_id = Uuid::new_v4();

    let first = repo
        .upsert(ProfileUpsert::onboarding_skipped(user_id))
        .await
        .unwrap();
    assert!(first.display_name.is_none());

    let second = repo
        .upsert(ProfileUpsert {
            id: user_id,
            display_name: Some("Quinn".to_owned()),
            preferred_genres: None,
            onboarding_completed: true,
        })
        .await
        .unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.display_name.as_deref(), Some("Quinn"));
}
