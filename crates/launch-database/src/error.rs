//! Database error types.

use launch_sync_core::StoreError;
use thiserror::Error;

/// Database error type.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Executor thread or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Row expected but absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row already present on insert
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using DatabaseError.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<DatabaseError> for StoreError {
    fn from(e: DatabaseError) -> Self {
        StoreError::new(e.to_string())
    }
}
