use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::common::PageQuery;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Validator {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub score: Option<f64>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpsertValidatorRequest {
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub score: Option<f64>,
    pub metadata: Option<String>,
}

impl Validator {
    pub async fn create(pool: &PgPool, req: UpsertValidatorRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO validators (name, email, is_active, is_verified, score, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(req.is_active)
        .bind(req.is_verified)
        .bind(req.score)
        .bind(&req.metadata)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM validators WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: &PageQuery) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM validators")
            .fetch_one(pool)
            .await?;
        let items =
            sqlx::query_as::<_, Self>("SELECT * FROM validators ORDER BY id LIMIT $1 OFFSET $2")
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
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM validators WHERE name ILIKE $1")
                .bind(&pattern)
                .fetch_one(pool)
                .await?;
        let items = sqlx::query_as::<_, Self>(
            "SELECT * FROM validators WHERE name ILIKE $1 ORDER BY id LIMIT $2 OFFSET $3",
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
        req: UpsertValidatorRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE validators
            SET name = $1, email = $2, is_active = $3, is_verified = $4,
                score = $5, metadata = $6, updated_at = NOW(), version = version + 1
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(req.is_active)
        .bind(req.is_verified)
        .bind(req.score)
        .bind(&req.metadata)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM validators WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
