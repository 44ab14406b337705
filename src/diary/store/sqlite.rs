use super::{EntryStore, StoreFuture};
use crate::diary::types::Entry;
use crate::error::StoreError;
use chrono::SecondsFormat;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// SQLite-backed entry log. Entries are stored as JSON payloads keyed by
/// session and creation time.
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

const DIARY_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS diary_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const DIARY_SCHEMA_VERSION_KEY: &str = "diary_schema_version";
const DIARY_SCHEMA_VERSION: u32 = 1;

async fn ensure_schema_version(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(DIARY_SCHEMA_META_TABLE).execute(pool).await?;

    let stored: Option<(String,)> =
        sqlx::query_as("SELECT value FROM diary_schema_meta WHERE key = $1")
            .bind(DIARY_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await?;

    if let Some((value,)) = stored {
        let parsed = value.parse::<u32>().map_err(|_| {
            StoreError::Migration(format!("invalid diary schema version value: {value}"))
        })?;
        if parsed != DIARY_SCHEMA_VERSION {
            return Err(StoreError::Migration(format!(
                "incompatible diary schema version: stored={parsed}, expected={DIARY_SCHEMA_VERSION}. \
remove the diary DB and restart."
            )));
        }
        return Ok(());
    }

    sqlx::query("INSERT INTO diary_schema_meta (key, value) VALUES ($1, $2)")
        .bind(DIARY_SCHEMA_VERSION_KEY)
        .bind(DIARY_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

impl SqliteEntryStore {
    /// Wrap an existing pool and create tables.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        ensure_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS diary_entries (
                 id         TEXT PRIMARY KEY,
                 session_id TEXT NOT NULL,
                 created_at TEXT NOT NULL,
                 payload    TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_diary_entries_session
                 ON diary_entries(session_id, created_at)",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::BackendUnavailable(format!("{}: {e}", parent.display()))
            })?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .map_err(|e| StoreError::BackendUnavailable(format!("{}: {e}", path.display())))?;
        Self::new(pool).await
    }

    /// Single-connection in-memory database, for tests and dry runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::BackendUnavailable(e.to_string()))?;
        Self::new(pool).await
    }
}

fn sortable_timestamp(entry: &Entry) -> String {
    entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn limit_to_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl EntryStore for SqliteEntryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn append<'a>(&'a self, session_id: &'a str, entry: &'a Entry) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let payload = serde_json::to_string(entry)?;
            sqlx::query(
                "INSERT INTO diary_entries (id, session_id, created_at, payload)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&entry.id)
            .bind(session_id)
            .bind(sortable_timestamp(entry))
            .bind(payload)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn list<'a>(&'a self, session_id: &'a str, limit: usize) -> StoreFuture<'a, Vec<Entry>> {
        Box::pin(async move {
            let rows: Vec<(String,)> = sqlx::query_as(
                "SELECT payload FROM diary_entries
                 WHERE session_id = $1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT $2",
            )
            .bind(session_id)
            .bind(limit_to_i64(limit))
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter()
                .map(|(payload,)| serde_json::from_str::<Entry>(&payload).map_err(StoreError::from))
                .collect()
        })
    }

    fn trim<'a>(&'a self, session_id: &'a str, max_count: usize) -> StoreFuture<'a, usize> {
        Box::pin(async move {
            let result = sqlx::query(
                "DELETE FROM diary_entries
                 WHERE session_id = $1
                   AND id NOT IN (
                       SELECT id FROM diary_entries
                       WHERE session_id = $1
                       ORDER BY created_at DESC, rowid DESC
                       LIMIT $2
                   )",
            )
            .bind(session_id)
            .bind(limit_to_i64(max_count))
            .execute(&self.pool)
            .await?;

            Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
        })
    }
}
