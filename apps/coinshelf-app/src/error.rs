//! # Application Error Types
//!
//! Store, configuration and API errors for the app layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Coinshelf                              │
//! │                                                                         │
//! │  Storage / codec                 App layer                Screen        │
//! │  ───────────────                 ─────────                ──────        │
//! │                                                                         │
//! │  DbError ─────┐                                                        │
//! │               ├──► StoreError ──┬──► CurrencyState.error ──► error view │
//! │  CoreError ───┘                 │                                       │
//! │                                 └──► ApiError { code, message }        │
//! │  ConfigError ──────────────────────► ApiError                          │
//! │                                                                         │
//! │  Mutations never fail synchronously. Persist failures surface through  │
//! │  the PersistTask and, optionally, the state's error field.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use coinshelf_core::CoreError;
use coinshelf_db::DbError;

// =============================================================================
// Store Error
// =============================================================================

/// Errors raised by [`crate::state::CurrencyStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend failed.
    ///
    /// ## When This Occurs
    /// - Hydration read failed (disk, permissions, locked database)
    /// - A persist write failed
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// The collection could not be encoded or the stored block decoded.
    #[error("{0}")]
    Codec(#[from] CoreError),

    /// The store was created outside a Tokio runtime.
    #[error("No async runtime available for background persistence")]
    RuntimeUnavailable,

    /// A persist task panicked or was cancelled.
    #[error("Persist task failed: {0}")]
    TaskFailed(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read, or the data directory created.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has wrong field types.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered back to TOML.
    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The platform has no home/data directory to default to.
    #[error("Could not determine app data directory")]
    NoDataDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from commands to the screen shell.
///
/// ## Serialization
/// ```json
/// {
///   "code": "STORAGE_ERROR",
///   "message": "Failed to read saved currencies"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Durable storage failed
    StorageError,

    /// Persisted data could not be understood
    CorruptData,

    /// Configuration is missing or invalid
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Open(e) => {
                ApiError::new(ErrorCode::StorageError, format!("Could not open database: {}", e))
            }
            DbError::Migration(_) => {
                ApiError::new(ErrorCode::StorageError, "Database schema is newer than this build")
            }
            DbError::Busy => {
                ApiError::new(ErrorCode::StorageError, "Database is busy, try again")
            }
            DbError::Closed => ApiError::new(ErrorCode::StorageError, "Database is closed"),
            DbError::Unavailable(e) => {
                ApiError::new(ErrorCode::StorageError, format!("Storage unavailable: {}", e))
            }
            DbError::Query(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Storage operation failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

/// Converts codec errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EncodeFailed(e) => ApiError::internal(format!("Failed to encode currencies: {}", e)),
            other => ApiError::new(ErrorCode::CorruptData, other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Storage(e) => ApiError::from(e),
            StoreError::Codec(e) => ApiError::from(e),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(format!("I/O error: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_data_code() {
        let err: ApiError = StoreError::Codec(CoreError::MalformedPayload("eof".into())).into();
        assert_eq!(err.code, ErrorCode::CorruptData);
        assert!(err.message.contains("eof"));
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err: ApiError = DbError::Query("disk I/O error at page 7".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(err.message, "Storage operation failed");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::ConfigError, "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"code": "CONFIG_ERROR", "message": "bad"}));
    }
}
