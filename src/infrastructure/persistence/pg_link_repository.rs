//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{LinkAnalytics, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const SHORT_CODE_CONSTRAINT: &str = "urls_short_code_key";

#[derive(Debug, FromRow)]
struct UrlRow {
    id: i64,
    short_code: String,
    original_url: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    owner_id: Option<String>,
    click_count: i64,
    last_accessed: Option<DateTime<Utc>>,
}

impl From<UrlRow> for ShortLink {
    fn from(row: UrlRow) -> Self {
        Self {
            id: row.id,
            code: row.short_code,
            long_url: row.original_url,
            created_at: row.created_at,
            expires_at: row.expires_at,
            owner_id: row.owner_id,
            click_count: row.click_count,
            last_accessed: row.last_accessed,
        }
    }
}

#[derive(Debug, FromRow)]
struct AnalyticsRow {
    short_code: String,
    click_count: i64,
    last_accessed: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for the `urls` table.
///
/// Id allocation uses the `urls_id_seq` sequence; code uniqueness is
/// enforced by the `urls_short_code_key` constraint.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Maps a violation of the short code constraint to a conflict carrying the code.
fn map_insert_error(e: sqlx::Error, code: &str) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
        && db.constraint() == Some(SHORT_CODE_CONSTRAINT)
    {
        return AppError::conflict(
            "Short code already exists",
            serde_json::json!({ "code": code }),
        );
    }
    AppError::from(e)
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn allocate_id(&self) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar("SELECT nextval('urls_id_seq')")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(id)
    }

    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let code = new_link.code.clone();

        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (id, short_code, original_url, created_at, expires_at, owner_id)
            VALUES (COALESCE($1, nextval('urls_id_seq')), $2, $3, $4, $5, $6)
            RETURNING id, short_code, original_url, created_at, expires_at, owner_id,
                      click_count, last_accessed
            "#,
        )
        .bind(new_link.id)
        .bind(new_link.code)
        .bind(new_link.long_url)
        .bind(new_link.created_at)
        .bind(new_link.expires_at)
        .bind(new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_insert_error(e, &code))?;

        Ok(row.into())
    }

    async fn find_active(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, short_code, original_url, created_at, expires_at, owner_id,
                   click_count, last_accessed
            FROM urls
            WHERE short_code = $1 AND (expires_at IS NULL OR expires_at > $2)
            "#,
        )
        .bind(code)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn increment_clicks(
        &self,
        code: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE urls
            SET click_count = click_count + 1,
                last_accessed = GREATEST(last_accessed, $2)
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .bind(accessed_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn read_analytics(&self, code: &str) -> Result<Option<LinkAnalytics>, AppError> {
        let row = sqlx::query_as::<_, AnalyticsRow>(
            "SELECT short_code, click_count, last_accessed FROM urls WHERE short_code = $1",
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| LinkAnalytics {
            code: r.short_code,
            click_count: r.click_count,
            last_accessed: r.last_accessed,
        }))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let codes: Vec<String> = sqlx::query_scalar(
            "DELETE FROM urls WHERE expires_at IS NOT NULL AND expires_at <= $1 RETURNING short_code",
        )
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(codes)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
