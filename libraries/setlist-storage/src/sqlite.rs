//! `SQLite`-backed byte store
//!
//! One row per key in the `byte_store` table. Writes are upserts, so a
//! `set` is durable once the statement completes.

use crate::error::StorageError;
use async_trait::async_trait;
use setlist_core::{ByteStore, Result};
use sqlx::{Row, SqlitePool};

/// Durable byte store on top of a `SQLite` pool
#[derive(Debug, Clone)]
pub struct SqliteByteStore {
    pool: SqlitePool,
}

impl SqliteByteStore {
    /// Wrap a pool whose migrations have already run
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`, creating the file and schema if needed
    pub async fn open(database_url: &str) -> std::result::Result<Self, StorageError> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ByteStore for SqliteByteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT value FROM byte_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|row| row.get::<Vec<u8>, _>("value")))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let now = setlist_core::clock::now_ms();

        sqlx::query(
            "INSERT INTO byte_store (key, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM byte_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
