//! # Key-Value Repository
//!
//! Whole-value storage addressed by a string key.
//!
//! ## Write Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Upsert by Key                                        │
//! │                                                                         │
//! │  set("crypto-data", v1)   ──► INSERT               (row created)       │
//! │  set("crypto-data", v2)   ──► ON CONFLICT UPDATE   (v1 gone)           │
//! │  get("crypto-data")       ──► Some(v2)                                 │
//! │  remove("crypto-data")    ──► DELETE               (returns true)      │
//! │  get("crypto-data")       ──► None                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque text; this layer never parses them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `key_value_store` table.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM key_value_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "Read key");
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// ## Example
    /// ```rust,ignore
    /// repo.set("crypto-data", &json).await?;
    /// ```
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Wrote key");
        Ok(())
    }

    /// Deletes `key`. Returns whether a row was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM key_value_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        debug!(key = %key, removed, "Removed key");
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
