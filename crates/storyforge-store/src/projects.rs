//! PostgreSQL implementation of `ProjectRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use storyforge_core::error::DomainError;
use storyforge_projects::{Project, ProjectDraft, ProjectPatch, ProjectRepository};
use uuid::Uuid;

use crate::persistence;

const PROJECT_COLUMNS: &str =
    "id, user_id, name, framework_id, stages_content, raw_story_idea, last_modified, created_at";

/// PostgreSQL-backed project repository.
#[derive(Debug, Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    /// Creates a new repository over the pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn project_from_row(row: &PgRow) -> Result<Project, DomainError> {
    Ok(Project {
        id: row.try_get("id").map_err(persistence)?,
        user_id: row.try_get("user_id").map_err(persistence)?,
        name: row.try_get("name").map_err(persistence)?,
        framework_id: row.try_get("framework_id").map_err(persistence)?,
        stages_content: row
            .try_get::<Json<HashMap<String, String>>, _>("stages_content")
            .map_err(persistence)?
            .0,
        raw_story_idea: row.try_get("raw_story_idea").map_err(persistence)?,
        last_modified: row.try_get("last_modified").map_err(persistence)?,
        created_at: row.try_get("created_at").map_err(persistence)?,
    })
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn insert(&self, draft: ProjectDraft) -> Result<Project, DomainError> {
        let sql = format!(
            "INSERT INTO projects (user_id, name, framework_id, stages_content, raw_story_idea)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(draft.user_id)
            .bind(&draft.name)
            .bind(&draft.framework_id)
            .bind(Json(&draft.stages_content))
            .bind(&draft.raw_story_idea)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)?;
        project_from_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ProjectPatch,
    ) -> Result<u64, DomainError> {
        let set_raw_idea = patch.raw_story_idea.is_some();
        let raw_idea = patch.raw_story_idea.flatten();
        let result = sqlx::query(
            "UPDATE projects SET
                 stages_content = COALESCE($3, stages_content),
                 raw_story_idea = CASE WHEN $4 THEN $5 ELSE raw_story_idea END,
                 last_modified = $6
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.stages_content.map(Json))
        .bind(set_raw_idea)
        .bind(raw_idea)
        .bind(patch.last_modified)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(result.rows_affected())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Project>, DomainError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE user_id = $1
             ORDER BY last_modified DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;
        rows.iter().map(project_from_row).collect()
    }
}
