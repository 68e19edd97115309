//! # coinshelf-db: Storage Layer for Coinshelf
//!
//! This crate provides durable key-value storage for the currency store.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coinshelf Data Flow                              │
//! │                                                                         │
//! │  CurrencyStore (hydrate / set_currencies)                              │
//! │       │                                                                 │
//! │       │  Arc<dyn KeyValueStorage>                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   coinshelf-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (key_value.rs)│    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ KeyValueRepo  │    │ 001_kv.sql   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   MemoryStorage (storage.rs) for tests and throwaway sessions  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/coinshelf/coinshelf.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the SQLite file (or an in-memory database)
//! - `migrations` - Embedded `key_value_store` schema
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`storage`] - The `KeyValueStorage` trait the store depends on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coinshelf_db::{Database, DbConfig, KeyValueStorage};
//!
//! let db = Database::new(DbConfig::new("path/to/coinshelf.db")).await?;
//!
//! let storage = db.key_values();
//! storage.set_item("crypto-data", r#"{"version":1,"currencies":[]}"#).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
mod migrations;
pub mod pool;
pub mod repository;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};
pub use repository::key_value::KeyValueRepository;
pub use storage::{KeyValueStorage, MemoryStorage};
