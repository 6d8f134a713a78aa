//! Error types for record encoding.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The record could not be serialized.
    #[error("marshal failed: {0}")]
    Marshal(String),

    /// The stored bytes could not be deserialized.
    #[error("unmarshal failed: {0}")]
    Unmarshal(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Decryption failed, usually because of a wrong secret.
    #[error("decryption failed: {0}")]
    Decrypt(String),
}

impl CodecError {
    /// Creates a marshal error.
    pub fn marshal(message: impl ToString) -> Self {
        Self::Marshal(message.to_string())
    }

    /// Creates an unmarshal error.
    pub fn unmarshal(message: impl ToString) -> Self {
        Self::Unmarshal(message.to_string())
    }

    /// Creates an encryption error.
    pub fn encrypt(message: impl ToString) -> Self {
        Self::Encrypt(message.to_string())
    }

    /// Creates a decryption error.
    pub fn decrypt(message: impl ToString) -> Self {
        Self::Decrypt(message.to_string())
    }
}
