//! Durable snapshot storage over SQLite.
//!
//! One record per partition plus one named record each for the label list
//! and the cleanup counters. Reads degrade silently: a missing or corrupt
//! record is a cache miss, logged and never propagated.

use std::path::PathBuf;

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::warn;

use crate::Result;
use crate::email::{CleanupStatsSet, Email, PartitionKey};
use mailsweep_gmail::Label;

/// Named record holding the label list.
const RECORD_LABELS: &str = "labels";
/// Named record holding the cleanup counters.
const RECORD_CLEANUP_COUNTS: &str = "cleanup_counters";

/// Repository for durable snapshot storage and retrieval.
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation
    /// fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation
    /// fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Default database location under the platform data directory.
    #[must_use]
    pub fn default_database_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("mailsweep").join("cache.db"))
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        // One snapshot per partition, payload is the serialized email list.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS partition_snapshots (
                partition_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Small named records: label list, cleanup counters.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cache_records (
                name TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a partition's snapshot, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn save_emails(&self, key: &PartitionKey, emails: &[Email]) -> Result<()> {
        let payload = serde_json::to_string(emails)?;
        sqlx::query(
            r"
            INSERT INTO partition_snapshots (partition_key, payload, cached_at)
            VALUES (?, ?, ?)
            ON CONFLICT(partition_key) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at
            ",
        )
        .bind(key.storage_key())
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load a partition's snapshot.
    ///
    /// Returns an empty list on a missing record, a corrupt payload, or any
    /// database failure; failures are logged, never propagated.
    pub async fn load_emails(&self, key: &PartitionKey) -> Vec<Email> {
        let storage_key = key.storage_key();
        let row = sqlx::query(r"SELECT payload FROM partition_snapshots WHERE partition_key = ?")
            .bind(&storage_key)
            .fetch_optional(&self.pool)
            .await;

        let payload: String = match row {
            Ok(Some(row)) => row.get("payload"),
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(partition = %storage_key, %err, "failed to read snapshot record");
                return Vec::new();
            }
        };

        match serde_json::from_str(&payload) {
            Ok(emails) => emails,
            Err(err) => {
                warn!(partition = %storage_key, %err, "corrupt snapshot record, treating as miss");
                Vec::new()
            }
        }
    }

    /// Persist the label list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn save_labels(&self, labels: &[Label]) -> Result<()> {
        self.save_record(RECORD_LABELS, &serde_json::to_string(labels)?)
            .await
    }

    /// Load the label list, empty on miss or corruption.
    pub async fn load_labels(&self) -> Vec<Label> {
        self.load_record(RECORD_LABELS).await.unwrap_or_default()
    }

    /// Persist the cleanup counters.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn save_cleanup_counts(&self, stats: &CleanupStatsSet) -> Result<()> {
        self.save_record(RECORD_CLEANUP_COUNTS, &serde_json::to_string(stats)?)
            .await
    }

    /// Load the cleanup counters, zeroed on miss or corruption.
    pub async fn load_cleanup_counts(&self) -> CleanupStatsSet {
        self.load_record(RECORD_CLEANUP_COUNTS)
            .await
            .unwrap_or_default()
    }

    /// Delete every record (sign-out).
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn clear_all(&self) -> Result<()> {
        sqlx::query(r"DELETE FROM partition_snapshots")
            .execute(&self.pool)
            .await?;
        sqlx::query(r"DELETE FROM cache_records")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_record(&self, name: &str, payload: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO cache_records (name, payload, cached_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                cached_at = excluded.cached_at
            ",
        )
        .bind(name)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_record<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let row = sqlx::query(r"SELECT payload FROM cache_records WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await;

        let payload: String = match row {
            Ok(Some(row)) => row.get("payload"),
            Ok(None) => return None,
            Err(err) => {
                warn!(record = %name, %err, "failed to read cache record");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(record = %name, %err, "corrupt cache record, treating as miss");
                None
            }
        }
    }

    /// Overwrite a partition record with raw bytes. Test-only corruption
    /// helper.
    #[cfg(test)]
    async fn save_raw(&self, key: &PartitionKey, payload: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO partition_snapshots (partition_key, payload, cached_at)
            VALUES (?, ?, ?)
            ON CONFLICT(partition_key) DO UPDATE SET payload = excluded.payload
            ",
        )
        .bind(key.storage_key())
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
