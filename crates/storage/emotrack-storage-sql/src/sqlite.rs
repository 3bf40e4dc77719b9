//! SQLite store adapter
//!
//! One row per `(device_id, person_id)`. Emotion times are kept as a JSON
//! object and `last_seen` as unix milliseconds. `rowid` preserves insertion
//! order, which is the order summaries list people in.
//!
//! Write transactions are serialized inside the process. SQLite allows one
//! writer at a time anyway, and a deferred transaction that reads before it
//! writes fails with `SQLITE_BUSY` if another writer committed in between.

use async_trait::async_trait;
use chrono::DateTime;
use emotrack_core::{
    EmotionStore, EmotionTimes, EmotrackError, PersonEmotionState, Result, StoreTransaction,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

const SELECT_ONE: &str = "SELECT device_id, person_id, emotion_times, last_seen \
     FROM person_emotions WHERE device_id = ? AND person_id = ?";

const SELECT_BY_DEVICE: &str = "SELECT device_id, person_id, emotion_times, last_seen \
     FROM person_emotions WHERE device_id = ? ORDER BY rowid";

const UPSERT: &str = r#"
    INSERT INTO person_emotions (device_id, person_id, emotion_times, last_seen)
    VALUES (?, ?, ?, ?)
    ON CONFLICT (device_id, person_id) DO UPDATE SET
        emotion_times = excluded.emotion_times,
        last_seen = excluded.last_seen
"#;

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn row_to_state(row: &SqliteRow) -> Result<PersonEmotionState> {
    let times_str: String = row.try_get("emotion_times")?;
    let millis: i64 = row.try_get("last_seen")?;
    let emotion_times: EmotionTimes = serde_json::from_str(&times_str)?;
    let last_seen = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| EmotrackError::store(format!("Invalid last_seen value: {}", millis)))?;

    Ok(PersonEmotionState {
        device_id: row.try_get("device_id")?,
        person_id: row.try_get("person_id")?,
        emotion_times,
        last_seen,
    })
}

async fn fetch_state<'e, E>(
    executor: E,
    device_id: &str,
    person_id: &str,
) -> Result<Option<PersonEmotionState>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(SELECT_ONE)
        .bind(device_id)
        .bind(person_id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(row_to_state).transpose()
}

async fn upsert_state<'e, E>(executor: E, state: &PersonEmotionState) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(UPSERT)
        .bind(&state.device_id)
        .bind(&state.person_id)
        .bind(serde_json::to_string(&state.emotion_times)?)
        .bind(state.last_seen.timestamp_millis())
        .execute(executor)
        .await?;

    Ok(())
}

/// SQLite emotion store
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl SqliteAdapter {
    /// Open (creating if missing) a SQLite database with a pool of 5 connections
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::with_max_connections(database_url, 5).await
    }

    /// Open a SQLite database with at most `max_connections` pooled connections.
    ///
    /// In-memory databases always use a single connection that is never
    /// recycled, otherwise the data would vanish with the connection.
    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Opening SQLite database at: {}", database_url);

        let in_memory = is_in_memory(database_url);
        let mut opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| EmotrackError::config(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);
        if !in_memory {
            opts = opts.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_opts = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_opts.connect_with(opts).await?;

        Ok(Self {
            pool,
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Create the schema if it does not exist yet
    pub async fn initialize(&self) -> Result<()> {
        debug!("Initializing SQLite schema...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS person_emotions (
                device_id TEXT NOT NULL,
                person_id TEXT NOT NULL,
                emotion_times TEXT NOT NULL DEFAULT '{}',
                last_seen INTEGER NOT NULL,
                PRIMARY KEY (device_id, person_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        info!("SQLite schema initialized successfully");
        Ok(())
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl EmotionStore for SqliteAdapter {
    async fn get(&self, device_id: &str, person_id: &str) -> Result<Option<PersonEmotionState>> {
        fetch_state(&self.pool, device_id, person_id).await
    }

    async fn put(&self, state: &PersonEmotionState) -> Result<()> {
        upsert_state(&self.pool, state).await
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<PersonEmotionState>> {
        let rows = sqlx::query(SELECT_BY_DEVICE)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_state).collect()
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let gate = self.write_gate.clone().lock_owned().await;
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction {
            tx: Some(tx),
            _gate: gate,
        }))
    }

    async fn is_ready(&self) -> Result<bool> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

/// Transaction over a [`SqliteAdapter`]; rolled back when dropped uncommitted
pub struct SqliteTransaction {
    // Dropped before the gate, so the next writer starts after this one is released.
    tx: Option<Transaction<'static, Sqlite>>,
    _gate: OwnedMutexGuard<()>,
}

impl SqliteTransaction {
    fn active(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        self.tx
            .as_mut()
            .ok_or_else(|| EmotrackError::store("transaction already committed"))
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn get(
        &mut self,
        device_id: &str,
        person_id: &str,
    ) -> Result<Option<PersonEmotionState>> {
        let tx = self.active()?;
        fetch_state(&mut **tx, device_id, person_id).await
    }

    async fn put(&mut self, state: &PersonEmotionState) -> Result<()> {
        let tx = self.active()?;
        upsert_state(&mut **tx, state).await
    }

    async fn commit(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file.db?mode=memory"));
        assert!(!is_in_memory("sqlite:emotion.db"));
    }

    #[tokio::test]
    async fn test_is_ready_after_open() {
        let adapter = SqliteAdapter::new(":memory:").await.unwrap();
        adapter.initialize().await.unwrap();
        assert!(adapter.is_ready().await.unwrap());

        adapter.close().await;
        assert!(!adapter.is_ready().await.unwrap());
    }

    #[tokio::test]
    async fn test_commit_twice_is_harmless() {
        let adapter = SqliteAdapter::new(":memory:").await.unwrap();
        adapter.initialize().await.unwrap();

        let mut tx = adapter.begin().await.unwrap();
        tx.commit().await.unwrap();
        tx.commit().await.unwrap();

        let err = tx
            .get("jetson_1", "1")
            .await
            .expect_err("committed transaction must not serve reads");
        assert!(matches!(err, EmotrackError::StoreUnavailable(_)));
    }
}
