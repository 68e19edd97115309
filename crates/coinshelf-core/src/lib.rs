//! # coinshelf-core: Pure Currency Logic for Coinshelf
//!
//! This crate holds everything about currencies that can be decided without
//! touching storage: the record types, the incremental search rules, the
//! persisted envelope format and the built-in reference datasets.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coinshelf Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Screen shell (mobile / CLI)                     │   │
//! │  │      Search box ──► Currency list ──► Insert / Clear buttons    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              coinshelf-app (store + commands)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ coinshelf-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  search   │  │ persisted │  │ reference │  │   │
//! │  │   │  Crypto   │  │ SearchQ.. │  │ envelope  │  │  datasets │  │   │
//! │  │   │  Fiat     │  │ MatchRule │  │ v0 / v1   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                coinshelf-db (storage layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Currency records (crypto and fiat variants)
//! - [`search`] - Query normalization and the three match rules
//! - [`persisted`] - Versioned JSON envelope for durable storage
//! - [`reference`] - Built-in crypto and fiat datasets
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use coinshelf_core::{filter_currencies, CurrencyRecord, SearchQuery};
//!
//! let currencies = vec![
//!     CurrencyRecord::crypto("BTC", "Bitcoin", "BTC"),
//!     CurrencyRecord::crypto("ETH", "Ethereum", "ETH"),
//! ];
//!
//! let query = SearchQuery::new("  BITCOIN ");
//! let found = filter_currencies(&currencies, &query);
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].id(), "BTC");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod persisted;
pub mod reference;
pub mod search;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use persisted::{decode_currencies, encode_currencies, PersistedCurrencies};
pub use search::{filter_currencies, match_rule, matches, MatchRule, SearchQuery};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the currency collection is persisted under.
///
/// Kept identical to the key used by earlier releases of the app so that
/// existing installs find their data on upgrade.
pub const DEFAULT_STORAGE_KEY: &str = "crypto-data";

/// Quiet period before a typed search query is applied.
pub const DEBOUNCE_SEARCH_MS: u64 = 300;

/// Current version of the persisted envelope.
///
/// ## Version History
/// - `0`: `{"state": {"currencies": [...]}, "version": 0}` (legacy)
/// - `1`: `{"version": 1, "currencies": [...]}`
pub const PERSISTED_SCHEMA_VERSION: u32 = 1;
