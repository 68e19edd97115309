//! # Database Handle
//!
//! Opens the SQLite file that backs [`KeyValueRepository`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Opening the Key-Value Store                        │
//! │                                                                         │
//! │  DbConfig::new("coinshelf.db")        DbConfig::in_memory()            │
//! │       │  WAL, NORMAL sync,                 │  one connection kept      │
//! │       │  busy timeout                      │  alive for the pool's life │
//! │       └──────────────┬─────────────────────┘                           │
//! │                      ▼                                                  │
//! │  Database::new(config).await ──► ensure_schema (key_value_store)       │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  db.key_values() ──► KeyValueRepository (shares the pool)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store issues one hydration read and a stream of whole-value writes,
//! so a handful of connections is plenty. WAL lets the read and a write
//! overlap.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations::ensure_schema;
use crate::repository::key_value::KeyValueRepository;

/// How long a write waits on a locked file before failing with `Busy`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Configuration
// =============================================================================

/// Where the key-value table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one `Database`; gone when it is closed or dropped.
    Memory,
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::File(path) => write!(f, "{}", path.display()),
            DbLocation::Memory => write!(f, ":memory:"),
        }
    }
}

/// Settings for [`Database::new`].
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new(data_dir.join("coinshelf.db")).max_connections(2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Pool size for file databases. In-memory databases always use one
    /// connection.
    pub max_connections: u32,
}

impl DbConfig {
    /// A file database at `path`, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// A throwaway database for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        if self.location != DbLocation::Memory {
            self.max_connections = max;
        }
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open key-value database. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and makes sure the schema exists.
    ///
    /// ## Returns
    /// * `Err(DbError::Open)` - file could not be opened or created
    /// * `Err(DbError::Migration)` - schema could not be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = %config.location, "Opening key-value database");

        let pool = match &config.location {
            DbLocation::File(path) => {
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .busy_timeout(BUSY_TIMEOUT);

                SqlitePoolOptions::new()
                    .max_connections(config.max_connections.max(1))
                    .connect_with(options)
                    .await
            }
            DbLocation::Memory => {
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| DbError::Open(e.to_string()))?;

                // Every new connection would see a fresh, empty database.
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
        }
        .map_err(|e| DbError::Open(e.to_string()))?;

        ensure_schema(&pool).await?;

        Ok(Database { pool })
    }

    /// Repository over this database's `key_value_store` table.
    pub fn key_values(&self) -> KeyValueRepository {
        KeyValueRepository::new(self.pool.clone())
    }

    /// Waits for in-flight statements and closes every connection.
    pub async fn close(&self) {
        info!("Closing key-value database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
