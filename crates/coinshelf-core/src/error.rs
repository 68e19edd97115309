//! # Error Types
//!
//! Domain-specific error types for coinshelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coinshelf-core errors (this file)                                     │
//! │  └── CoreError        - Envelope encode/decode failures                │
//! │                                                                         │
//! │  coinshelf-db errors (separate crate)                                  │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  coinshelf-app errors                                                  │
//! │  ├── StoreError       - Hydration / persistence failures               │
//! │  └── ApiError         - What the screen shell sees (serialized)        │
//! │                                                                         │
//! │  Flow: CoreError / DbError → StoreError → ApiError → Screen            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The search engine itself never fails: an unmatched query is an empty
//! result, not an error. Everything here comes from the storage boundary.

use thiserror::Error;

/// Core errors raised while reading or writing the persisted collection.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Stored text is not valid JSON.
    ///
    /// ## When This Occurs
    /// - The storage entry was truncated by a crash mid-write
    /// - Another program wrote to the same key
    #[error("Persisted currencies are not valid JSON: {0}")]
    MalformedPayload(String),

    /// Stored JSON does not have the shape of any known envelope.
    ///
    /// ## When This Occurs
    /// - `currencies` is missing or is not an array
    /// - A record lacks `id`, `name` or `symbol`
    #[error("Persisted currencies have an unexpected shape: {0}")]
    UnexpectedShape(String),

    /// Stored envelope was written by a newer release.
    ///
    /// ## User Workflow
    /// ```text
    /// Install v3 ──► writes {"version": 3, ...}
    ///      │
    ///      ▼
    /// Downgrade to v2 ──► reads version 3
    ///      │
    ///      ▼
    /// UnsupportedVersion { found: 3, supported: 1 }
    ///      │
    ///      ▼
    /// Store starts empty instead of guessing at the format
    /// ```
    #[error("Persisted currencies use schema version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The collection could not be serialized.
    #[error("Failed to encode currencies: {0}")]
    EncodeFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
