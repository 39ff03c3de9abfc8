//! Error types for the task store

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by repository and store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// An update or delete referenced an id with no live record.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The schema upgrade failed at open time, or the on-disk version is
    /// one this build does not understand. The database is left readable
    /// at its prior version.
    #[error("schema migration failed: {0}")]
    Migration(String),

    /// Engine-level storage failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure while creating the database location
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
