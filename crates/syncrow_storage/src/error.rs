//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite engine reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// An I/O error occurred while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A row was asked for a column it does not have.
    #[error("column {index} out of range, row has {len} columns")]
    ColumnIndex {
        /// The requested column index.
        index: usize,
        /// The number of columns in the row.
        len: usize,
    },

    /// A column held a value of an unexpected type.
    #[error("column {index}: expected {expected}, found {found}")]
    ColumnType {
        /// The column index.
        index: usize,
        /// The expected type name.
        expected: &'static str,
        /// The type name actually found.
        found: &'static str,
    },
}

impl StorageError {
    /// Creates a column type mismatch error.
    pub fn column_type(index: usize, expected: &'static str, found: &'static str) -> Self {
        Self::ColumnType {
            index,
            expected,
            found,
        }
    }
}
