use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::routes::common::PageQuery;

/// 存储条目以 UUID 作为主键，与其余资源的自增ID不同
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StorageEntry {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub is_archived: bool,
    pub storage_size: Option<i64>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpsertStorageEntryRequest {
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub storage_size: Option<i64>,
    pub content_type: Option<String>,
}

impl StorageEntry {
    pub async fn create(
        pool: &PgPool,
        req: UpsertStorageEntryRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO storage_entries
                (id, name, is_active, is_archived, storage_size, content_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(req.is_active)
        .bind(req.is_archived)
        .bind(req.storage_size)
        .bind(&req.content_type)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM storage_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: &PageQuery) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM storage_entries")
            .fetch_one(pool)
            .await?;
        let items = sqlx::query_as::<_, Self>(
            "SELECT * FROM storage_entries ORDER BY created_at, id LIMIT $1 OFFSET $2",
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
            "SELECT COUNT(*) FROM storage_entries WHERE name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
        let items = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM storage_entries
            WHERE name ILIKE $1
            ORDER BY created_at, id LIMIT $2 OFFSET $3
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
        id: Uuid,
        req: UpsertStorageEntryRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE storage_entries
            SET name = $1, is_active = $2, is_archived = $3, storage_size = $4,
                content_type = $5, updated_at = NOW(), version = version + 1
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(req.is_active)
        .bind(req.is_archived)
        .bind(req.storage_size)
        .bind(&req.content_type)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM storage_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
