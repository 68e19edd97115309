//! # Storage Errors
//!
//! One error type for every [`crate::KeyValueStorage`] backend.
//!
//! ```text
//! sqlx::Error / MigrateError ──► DbError ──► StoreError (app) ──► ApiError
//! test doubles ──────────────────► DbError::Unavailable
//! ```

use thiserror::Error;

/// SQLite primary result codes that mean "try again later".
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    ///
    /// ## When This Occurs
    /// - Parent directory missing or read-only
    /// - File is not a SQLite database
    #[error("Could not open database: {0}")]
    Open(String),

    /// The `key_value_store` schema could not be brought up to date.
    ///
    /// ## When This Occurs
    /// - The file was written by a newer build with migrations this one lacks
    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// Another connection held the lock for too long.
    #[error("Database is busy")]
    Busy,

    /// The pool was closed before the call.
    #[error("Database is closed")]
    Closed,

    /// A read or write statement failed.
    #[error("Storage query failed: {0}")]
    Query(String),

    /// Non-SQL backend refused the call.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::Busy,
            sqlx::Error::PoolClosed => DbError::Closed,
            sqlx::Error::Database(db_err) => {
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i64>().ok())
                    .map(|code| code & 0xff);
                match primary {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => DbError::Busy,
                    _ => DbError::Query(db_err.message().to_string()),
                }
            }
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
