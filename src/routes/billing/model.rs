use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::common::PageQuery;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct BillingModule {
    pub id: i64,
    pub module_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_recurring: bool,
    pub price: Option<f64>,
    pub billing_cycle_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpsertBillingModuleRequest {
    pub module_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_recurring: bool,
    pub price: Option<f64>,
    pub billing_cycle_days: Option<i32>,
}

impl BillingModule {
    pub async fn create(
        pool: &PgPool,
        req: UpsertBillingModuleRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO billing_modules
                (module_name, description, is_active, is_recurring, price, billing_cycle_days)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&req.module_name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(req.is_recurring)
        .bind(req.price)
        .bind(req.billing_cycle_days)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM billing_modules WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, query: &PageQuery) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM billing_modules")
            .fetch_one(pool)
            .await?;
        let items = sqlx::query_as::<_, Self>(
            "SELECT * FROM billing_modules ORDER BY id LIMIT $1 OFFSET $2",
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
            "SELECT COUNT(*) FROM billing_modules WHERE module_name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
        let items = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM billing_modules
            WHERE module_name ILIKE $1
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
        req: UpsertBillingModuleRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE billing_modules
            SET module_name = $1, description = $2, is_active = $3, is_recurring = $4,
                price = $5, billing_cycle_days = $6, updated_at = NOW(), version = version + 1
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&req.module_name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(req.is_recurring)
        .bind(req.price)
        .bind(req.billing_cycle_days)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM billing_modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
