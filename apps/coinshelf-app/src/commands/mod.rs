//! # Commands Module
//!
//! Everything a front end calls. Front ends (the `coinshelf` CLI today) never
//! touch the store's internals; they go through these functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! └── currency.rs  ◄─── get_currencies, list_view, insert_*/clear_data
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end                                                             │
//! │  ─────────                                                             │
//! │  let response = get_currencies(&store, Some("eth"));                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CurrencyStore snapshot + memoized filter                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CurrenciesResponse { currencies, loading, error, totalCount }         │
//! │         │  (serde, camelCase)                                           │
//! │         ▼                                                               │
//! │  list_view() ──► what to draw                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod currency;
