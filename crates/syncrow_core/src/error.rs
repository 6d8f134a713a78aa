//! Error types for syncrow core.

use syncrow_codec::CodecError;
use syncrow_storage::StorageError;
use thiserror::Error;

/// Result type for table operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors returned by [`crate::SyncTable`].
///
/// Stale and tombstone-suppressed remote writes are not errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The id has neither a remote nor a local entry.
    #[error("record not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A record could not be marshaled or encrypted.
    #[error("failed to encode record {id}: {source}")]
    Encode {
        /// The record id.
        id: String,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// A stored payload could not be decrypted or unmarshaled.
    #[error("failed to decode record {id}: {source}")]
    Decode {
        /// The record id.
        id: String,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// The store rejected a statement.
    #[error("{op} failed for {target}: {source}")]
    Store {
        /// The table operation that was running.
        op: &'static str,
        /// The record id, or the table name for whole-table operations.
        target: String,
        /// The storage failure.
        #[source]
        source: StorageError,
    },
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates an encode error.
    pub fn encode(id: impl Into<String>, source: CodecError) -> Self {
        Self::Encode {
            id: id.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(id: impl Into<String>, source: CodecError) -> Self {
        Self::Decode {
            id: id.into(),
            source,
        }
    }

    /// Creates a store error.
    pub fn store(op: &'static str, target: impl Into<String>, source: StorageError) -> Self {
        Self::Store {
            op,
            target: target.into(),
            source,
        }
    }

    /// Returns true for [`CoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Attaches operation context to storage results.
pub(crate) trait StoreContext<T> {
    fn context(self, op: &'static str, target: &str) -> CoreResult<T>;
}

impl<T> StoreContext<T> for Result<T, StorageError> {
    fn context(self, op: &'static str, target: &str) -> CoreResult<T> {
        self.map_err(|source| CoreError::store(op, target, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = CoreError::not_found("a");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "record not found: a");

        let failed: Result<(), StorageError> = Err(StorageError::ColumnIndex { index: 2, len: 1 });
        let err = failed.context("save_remote", "note-1").unwrap_err();
        assert!(!err.is_not_found());
        let shown = err.to_string();
        assert!(shown.starts_with("save_remote failed for note-1"));
    }

    #[test]
    fn codec_source_is_kept() {
        let err = CoreError::decode("x", CodecError::decrypt("authentication failed"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("authentication failed"));
    }
}
