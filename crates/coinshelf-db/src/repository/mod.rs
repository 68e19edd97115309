//! # Repository Module
//!
//! Database repository implementations for Coinshelf.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CurrencyStore                                                         │
//! │       │                                                                 │
//! │       │  storage.set_item("crypto-data", json)                         │
//! │       ▼                                                                 │
//! │  KeyValueRepository                                                    │
//! │  ├── get(&self, key)                                                   │
//! │  ├── set(&self, key, value)                                            │
//! │  ├── remove(&self, key)                                                │
//! │  └── keys(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  key_value_store table                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`key_value::KeyValueRepository`] - Whole-value reads and overwrites by key

pub mod key_value;
