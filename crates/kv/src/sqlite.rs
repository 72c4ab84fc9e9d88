//! SQLite KV backend.

use crate::error::KvResult;
use crate::store::KvStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;

/// SQLite-backed store for single-instance deployments.
///
/// Expiry timestamps are stored as unix milliseconds; NULL means no expiry.
pub struct SqliteKvStore {
    pool: Pool<Sqlite>,
}

impl SqliteKvStore {
    /// Open (or create) the database at `path`.
    pub async fn new(path: impl AsRef<Path>) -> KvResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite:{}?mode=rwc",
            path.display()
        ))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        // Prevent transient "database is locked" errors under load.
        .busy_timeout(Duration::from_secs(5));

        // A single connection serializes writes, which also makes the
        // upsert-based increment one atomic step.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> KvResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_kv_entries_expires_at
             ON kv_entries (expires_at) WHERE expires_at IS NOT NULL",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn now_millis() -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }

    fn ttl_millis(ttl: Duration) -> i64 {
        i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM kv_entries
             WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
        )
        .bind(key)
        .bind(Self::now_millis())
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()> {
        let expires_at =
            ttl.map(|ttl| Self::now_millis().saturating_add(Self::ttl_millis(ttl)));
        sqlx::query(
            "INSERT INTO kv_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> KvResult<u64> {
        let now = Self::now_millis();
        let fresh_expiry = now.saturating_add(Self::ttl_millis(ttl));

        // One upsert so concurrent callers serialize in the database: an
        // expired row restarts the window, a live row keeps its expiry.
        let count: i64 = sqlx::query_scalar(
            "INSERT INTO kv_entries (key, value, expires_at) VALUES (?1, '1', ?2)
             ON CONFLICT(key) DO UPDATE SET
                 value = CASE
                     WHEN kv_entries.expires_at IS NOT NULL AND kv_entries.expires_at <= ?3
                         THEN '1'
                     ELSE CAST(CAST(kv_entries.value AS INTEGER) + 1 AS TEXT)
                 END,
                 expires_at = CASE
                     WHEN kv_entries.expires_at IS NOT NULL AND kv_entries.expires_at <= ?3
                         THEN ?2
                     ELSE kv_entries.expires_at
                 END
             RETURNING CAST(value AS INTEGER)",
        )
        .bind(key)
        .bind(fresh_expiry)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn purge_expired(&self) -> KvResult<u64> {
        let result =
            sqlx::query("DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1")
                .bind(Self::now_millis())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn health_check(&self) -> KvResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
