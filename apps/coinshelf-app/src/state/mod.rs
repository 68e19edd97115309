//! # State Module
//!
//! Application state for the currency list.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────────────────────────────┐   │
//! │  │    AppConfig     │   │              CurrencyStore               │   │
//! │  │                  │   │                                          │   │
//! │  │  storage key     │──►│  watch::Sender<Arc<CurrencyState>>       │   │
//! │  │  db path         │   │  Arc<dyn KeyValueStorage>                │   │
//! │  │  debounce        │   │  FilteredCurrencies (memo)               │   │
//! │  └──────────────────┘   └──────────────────────────────────────────┘   │
//! │           │                                 ▲                           │
//! │           │                                 │ settled query             │
//! │           ▼                                 │                           │
//! │  ┌──────────────────────────────────────────┴─────────────────────┐    │
//! │  │                       QueryDebouncer                           │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • AppConfig: Read-only after startup                                  │
//! │  • CurrencyStore: Snapshots are immutable; writes serialize on a lock  │
//! │  • QueryDebouncer: Owns its task, aborted on drop                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod currency;
mod search;

pub use config::{AppConfig, PersistenceSettings, SearchSettings, StorageSettings, MAX_DEBOUNCE_MS};
pub use currency::{
    CurrencyState, CurrencyStore, HydrationOutcome, PersistOutcome, PersistTask, StoreOptions,
};
pub use search::{FilteredCurrencies, QueryDebouncer};
