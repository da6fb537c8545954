//! PostgreSQL implementation of `VersionRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use storyforge_core::error::DomainError;
use storyforge_versions::{NewVersion, ProjectVersion, VersionRepository};
use uuid::Uuid;

use crate::persistence;

const VERSION_COLUMNS: &str =
    "id, project_id, user_id, stages_content, raw_story_idea, version_name, created_at";

/// PostgreSQL-backed version repository.
#[derive(Debug, Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Creates a new repository over the pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn version_from_row(row: &PgRow) -> Result<ProjectVersion, DomainError> {
    Ok(ProjectVersion {
        id: row.try_get("id").map_err(persistence)?,
        project_id: row.try_get("project_id").map_err(persistence)?,
        user_id: row.try_get("user_id").map_err(persistence)?,
        stages_content: row
            .try_get::<Json<HashMap<String, String>>, _>("stages_content")
            .map_err(persistence)?
            .0,
        raw_story_idea: row.try_get("raw_story_idea").map_err(persistence)?,
        version_name: row.try_get("version_name").map_err(persistence)?,
        created_at: row.try_get("created_at").map_err(persistence)?,
    })
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn insert(&self, version: NewVersion) -> Result<ProjectVersion, DomainError> {
        let sql = format!(
            "INSERT INTO project_versions
                 (project_id, user_id, stages_content, raw_story_idea, version_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VERSION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(version.project_id)
            .bind(version.user_id)
            .bind(Json(&version.stages_content))
            .bind(&version.raw_story_idea)
            .bind(&version.version_name)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)?;
        version_from_row(&row)
    }

    async fn list_for_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ProjectVersion>, DomainError> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM project_versions
             WHERE project_id = $1 AND user_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT $3"
        );
        let rows = sqlx::query(&sql)
            .bind(project_id)
            .bind(user_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;
        rows.iter().map(version_from_row).collect()
    }

    async fn list_ids_newest_first(&self, project_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let rows = sqlx::query(
            "SELECT id FROM project_versions
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;
        rows.iter()
            .map(|row| row.try_get("id").map_err(persistence))
            .collect()
    }

    async fn delete_by_ids(&self, ids: &[Uuid]) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM project_versions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(result.rows_affected())
    }
}
