//! # Key-Value Storage Trait
//!
//! The durable-storage contract the currency store is written against.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStorage                                      │
//! │                                                                         │
//! │        get_item(key)  /  set_item(key, value)  /  remove_item(key)      │
//! │                              │                                          │
//! │            ┌─────────────────┴──────────────────┐                       │
//! │            ▼                                    ▼                       │
//! │  ┌────────────────────┐              ┌────────────────────┐             │
//! │  │ KeyValueRepository │              │   MemoryStorage    │             │
//! │  │ SQLite, durable    │              │ HashMap, tests and │             │
//! │  │                    │              │ throwaway sessions │             │
//! │  └────────────────────┘              └────────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call may be slow and must be awaited. Values are whole blocks; there
//! are no partial updates.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::repository::key_value::KeyValueRepository;

/// Async get/set/remove of opaque text values by key.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Overwrites the value under `key`.
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> DbResult<()>;
}

#[async_trait]
impl KeyValueStorage for KeyValueRepository {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.get(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.set(key, value).await
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.remove(key).await.map(|_| ())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with one entry.
    ///
    /// ## Example
    /// ```rust
    /// use coinshelf_db::MemoryStorage;
    ///
    /// let storage = MemoryStorage::with_entry("crypto-data", r#"{"currencies":[]}"#);
    /// ```
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryStorage {
            entries: RwLock::new(entries),
        }
    }

    /// Returns a copy of the value under `key` without going through the trait.
    pub async fn snapshot(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::sync::Arc;

    async fn exercise(storage: Arc<dyn KeyValueStorage>) {
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "one").await.unwrap();
        storage.set_item("k", "two").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("two"));

        storage.remove_item("k").await.unwrap();
        storage.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_contract() {
        exercise(Arc::new(MemoryStorage::new())).await;
    }

    #[tokio::test]
    async fn test_sqlite_storage_contract() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        exercise(Arc::new(db.key_values())).await;
    }

    #[tokio::test]
    async fn test_with_entry() {
        let storage = MemoryStorage::with_entry("crypto-data", "payload");

        assert_eq!(
            storage.get_item("crypto-data").await.unwrap().as_deref(),
            Some("payload")
        );
        assert_eq!(storage.snapshot("crypto-data").await.as_deref(), Some("payload"));
    }
}
