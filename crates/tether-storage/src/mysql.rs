use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tether_core::repository::{LinkId, LinkRecord, LinkRepository, NewLink, Result};
use tether_core::{ShortCode, StorageError};
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../ddl/mysql/short_links.sql");

/// MySQL implementation of the link store.
///
/// The unique key on `short_code` is the single arbiter of code ownership:
/// inserts that lose a race surface as [`StorageError::Conflict`].
/// Timestamps are stored as unix seconds.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("ensured short_links schema");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

fn parse_timestamp(column: &str, seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn record_from_row(row: &MySqlRow) -> Result<LinkRecord> {
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    Ok(LinkRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        code: row.try_get("short_code").map_err(map_sqlx_error)?,
        target: row.try_get("target_url").map_err(map_sqlx_error)?,
        click_count: row.try_get("click_count").map_err(map_sqlx_error)?,
        is_generated: row.try_get("is_generated").map_err(map_sqlx_error)?,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

/// Sorts driver failures into [`StorageError`] kinds.
///
/// Only unique-key violations become `Conflict`, and that is handled before
/// this is reached. Every kind produced here surfaces to callers as
/// `StoreUnavailable` (HTTP 503), so a timed-out or unreachable database never
/// reads as an unknown code or a taken alias.
fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl LinkRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, target_url, click_count, is_generated, created_at, updated_at
            FROM short_links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        let now = now_unix_seconds();
        let is_generated = link.is_generated();

        let result = sqlx::query(
            r#"
            INSERT INTO short_links (short_code, target_url, click_count, is_generated, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(link.code.as_str())
        .bind(link.target.as_str())
        .bind(is_generated)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let created_at = parse_timestamp("created_at", now)?;
                debug!(id = done.last_insert_id(), code = %link.code, "Inserted link");
                Ok(LinkRecord {
                    id: done.last_insert_id(),
                    code: link.code.as_str().to_owned(),
                    target: link.target,
                    click_count: 0,
                    is_generated,
                    created_at,
                    updated_at: created_at,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_clicks(&self, id: LinkId) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(now_unix_seconds())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::InvalidData(format!("no link with id {id}")));
        }
        Ok(())
    }

    async fn increment_clicks_by_code(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1, updated_at = ?
            WHERE short_code = ?
            "#,
        )
        .bind(now_unix_seconds())
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::InvalidData(format!(
                "no link with short code '{code}'"
            )));
        }
        Ok(())
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}
