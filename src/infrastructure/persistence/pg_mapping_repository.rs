//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::{InsertOutcome, MappingRepository};
use crate::error::AppError;

/// Row shape of the `mappings` table.
#[derive(Debug, sqlx::FromRow)]
struct MappingRow {
    url_code: String,
    long_url: String,
    short_url: String,
    posted_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<MappingRow> for Mapping {
    fn from(row: MappingRow) -> Self {
        Mapping {
            code: row.url_code,
            long_url: row.long_url,
            short_url: row.short_url,
            posted_at: row.posted_at,
            expires_at: row.expires_at,
        }
    }
}

/// PostgreSQL repository for mapping storage and retrieval.
///
/// Uses bound parameters for every query; the schema lives in `migrations/`.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn get(&self, code: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT url_code, long_url, short_url, posted_at, expires_at
            FROM mappings
            WHERE url_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn put(&self, mapping: Mapping) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO mappings (url_code, long_url, short_url, posted_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url_code) DO UPDATE SET
                long_url = EXCLUDED.long_url,
                short_url = EXCLUDED.short_url,
                posted_at = EXCLUDED.posted_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&mapping.code)
        .bind(&mapping.long_url)
        .bind(&mapping.short_url)
        .bind(mapping.posted_at)
        .bind(mapping.expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_if_absent(&self, new_mapping: NewMapping) -> Result<InsertOutcome, AppError> {
        let inserted = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO mappings (url_code, long_url, short_url, posted_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url_code) DO NOTHING
            RETURNING url_code, long_url, short_url, posted_at, expires_at
            "#,
        )
        .bind(&new_mapping.code)
        .bind(&new_mapping.long_url)
        .bind(&new_mapping.short_url)
        .bind(new_mapping.posted_at)
        .bind(new_mapping.expires_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Inserted(row.into()));
        }

        // The conflicting row may be swept between the two statements.
        match self.get(&new_mapping.code).await? {
            Some(existing) => Ok(InsertOutcome::Occupied(existing)),
            None => Err(AppError::internal(
                "Mapping changed concurrently, retry the request",
                json!({ "code": new_mapping.code }),
            )),
        }
    }

    async fn find_expired(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Mapping>, AppError> {
        let rows = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT url_code, long_url, short_url, posted_at, expires_at
            FROM mappings
            WHERE expires_at < $1
            ORDER BY expires_at ASC
            LIMIT $2
            "#,
        )
        .bind(before)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Mapping::from).collect())
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM mappings WHERE url_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mappings")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_expired(&self, before: DateTime<Utc>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mappings WHERE expires_at < $1")
            .bind(before)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
