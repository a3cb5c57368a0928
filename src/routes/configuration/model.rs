use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::common::PageQuery;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ProjectConfiguration {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_default: bool,
    pub configuration_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpsertProjectConfigurationRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    pub configuration_json: Option<String>,
}

impl ProjectConfiguration {
    pub async fn create(
        pool: &PgPool,
        req: UpsertProjectConfigurationRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO project_configurations
                (name, description, is_active, is_default, configuration_json)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(req.is_default)
        .bind(&req.configuration_json)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM project_configurations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: &PageQuery) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM project_configurations")
                .fetch_one(pool)
                .await?;
        let items = sqlx::query_as::<_, Self>(
            "SELECT * FROM project_configurations ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(query.page_size())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

        Ok((items, total))
    }

    pub async fn search(
        pool: &PgPool,
        term: &str,
        query: &PageQuery,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let pattern = format!("%{}%", term);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_configurations WHERE name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
        let items = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM project_configurations
            WHERE name ILIKE $1
            ORDER BY id LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(query.page_size())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

        Ok((items, total))
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: UpsertProjectConfigurationRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE project_configurations
            SET name = $1, description = $2, is_active = $3, is_default = $4,
                configuration_json = $5, updated_at = NOW(), version = version + 1
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(req.is_default)
        .bind(&req.configuration_json)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_configurations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
