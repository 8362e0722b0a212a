//! Error types for incubator-store.

use std::path::PathBuf;

/// Result type for incubator-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in incubator-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The stored active record cannot be decoded or breaks an invariant.
    #[error("Active incubation record is corrupt ({field}): {reason}")]
    ActiveRecordCorrupt { field: &'static str, reason: String },

    /// A history row cannot be decoded. Nothing is returned from the archive.
    #[error("History archive is corrupt at row {row}: {reason}")]
    HistoryArchiveCorrupt { row: i64, reason: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Error> for incubator_core::Error {
    fn from(err: Error) -> Self {
        incubator_core::Error::storage(err)
    }
}
