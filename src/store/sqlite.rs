use crate::core::config::StoreConfig;
use crate::core::error::{QuoteError, Result};
use crate::core::{QuoteRecord, QuoteStore};
use async_trait::async_trait;
use sqlx::{Connection, SqlitePool};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// SQLite-backed quote log. A single pooled connection serializes writes.
pub struct SqliteQuoteStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteQuoteStore {
    /// Opens (creating if missing) the database file and ensures the schema.
    pub async fn initialize(config: &StoreConfig) -> Result<Self> {
        info!(path = %config.path.display(), "Initializing database connection...");
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::initialize_schema(&pool).await?;
        info!("Database initialized successfully.");

        Ok(Self {
            pool,
            timeout: config.timeout(),
        })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cotacoes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bid TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Commits only if the row was written before the deadline. A timeout
    /// rolls the transaction back explicitly, so an error never leaves a row.
    async fn insert_within_deadline(&self, bid: &str) -> Result<()> {
        let deadline = Instant::now() + self.timeout;

        let mut conn = match tokio::time::timeout_at(deadline, self.pool.acquire()).await {
            Ok(conn) => conn?,
            Err(_) => return Err(QuoteError::timeout("quote insert", self.timeout)),
        };

        let mut tx = conn.begin().await?;
        let written = tokio::time::timeout_at(
            deadline,
            sqlx::query("INSERT INTO cotacoes (bid) VALUES (?)")
                .bind(bid)
                .execute(&mut *tx),
        )
        .await;

        match written {
            Ok(Ok(_)) => {
                tx.commit().await?;
                Ok(())
            }
            Ok(Err(e)) => {
                tx.rollback().await?;
                Err(e.into())
            }
            Err(_) => {
                tx.rollback().await?;
                Err(QuoteError::timeout("quote insert", self.timeout))
            }
        }
    }
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    async fn insert(&self, bid: &str) -> Result<()> {
        match self.insert_within_deadline(bid).await {
            Ok(()) => {
                debug!(bid, "Persisted quote");
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                error!(timeout = ?self.timeout, "Persisting quote timed out");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "Failed to persist quote");
                Err(e)
            }
        }
    }

    async fn recent(&self, limit: u32) -> Result<Vec<QuoteRecord>> {
        let records = sqlx::query_as::<_, QuoteRecord>(
            "SELECT id, bid, timestamp FROM cotacoes ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path, timeout_ms: u64) -> StoreConfig {
        StoreConfig {
            path: dir.join("cotacoes.db"),
            timeout_ms,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let dir = tempdir().unwrap();
        let store = SqliteQuoteStore::initialize(&config_in(dir.path(), 1000))
            .await
            .unwrap();

        assert!(store.recent(10).await.unwrap().is_empty());

        store.insert("5.2543").await.unwrap();
        store.insert("5.2601").await.unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        // Newest first
        assert_eq!(records[0].bid, "5.2601");
        assert_eq!(records[1].bid, "5.2543");
        assert!(records[0].id > records[1].id);

        let age = Utc::now().naive_utc() - records[0].timestamp;
        assert!(age.num_minutes().abs() < 5, "timestamp defaulted to now");
    }

    #[tokio::test]
    async fn test_recent_honours_limit() {
        let dir = tempdir().unwrap();
        let store = SqliteQuoteStore::initialize(&config_in(dir.path(), 1000))
            .await
            .unwrap();

        for bid in ["5.1", "5.2", "5.3"] {
            store.insert(bid).await.unwrap();
        }

        let records = store.recent(1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bid, "5.3");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_and_keeps_rows() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), 1000);
        {
            let store = SqliteQuoteStore::initialize(&config).await.unwrap();
            store.insert("5.25").await.unwrap();
            store.pool.close().await;
        }

        let reopened = SqliteQuoteStore::initialize(&config).await.unwrap();
        let records = reopened.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bid, "5.25");
    }

    #[tokio::test]
    async fn test_initialize_fails_for_unreachable_path() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            path: dir.path().join("missing").join("nested").join("cotacoes.db"),
            timeout_ms: 10,
        };

        let err = SqliteQuoteStore::initialize(&config).await.err().unwrap();
        assert!(matches!(err, QuoteError::Storage(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_insert_times_out_with_zero_deadline() {
        let dir = tempdir().unwrap();
        let store = SqliteQuoteStore::initialize(&config_in(dir.path(), 0))
            .await
            .unwrap();

        let err = store.insert("5.25").await.unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_insert_never_leaves_a_row() {
        let dir = tempdir().unwrap();
        let store = SqliteQuoteStore::initialize(&config_in(dir.path(), 1000))
            .await
            .unwrap();

        let mut expected = 0;
        for i in 0..50u64 {
            let tight = SqliteQuoteStore {
                pool: store.pool.clone(),
                timeout: Duration::from_micros(i * 20),
            };
            match tight.insert("5.25").await {
                Ok(()) => expected += 1,
                Err(e) => assert!(e.is_timeout(), "got {e:?}"),
            }
            assert_eq!(store.recent(1000).await.unwrap().len(), expected);

            // The connection stays usable after a rolled back insert
            store.insert("5.30").await.unwrap();
            expected += 1;
        }
        assert_eq!(store.recent(1000).await.unwrap().len(), expected);
    }
}
