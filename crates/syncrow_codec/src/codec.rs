//! The record codec used by a table.

use crate::cipher::{AesGcmCipher, Cipher, Secret};
use crate::error::CodecResult;
use crate::marshal::Marshaler;
use std::sync::Arc;

/// Encodes records of type `R` for storage under a given id.
///
/// Without a secret, `encode` is just the marshaler. With a secret, the
/// marshaled bytes are encrypted with key material `secret || id`, so the
/// same bytes decoded under a different id fail to decrypt.
pub struct RecordCodec<R> {
    marshaler: Arc<dyn Marshaler<R>>,
    cipher: Arc<dyn Cipher>,
    secret: Option<Secret>,
}

impl<R> RecordCodec<R> {
    /// Creates a codec with the default cipher and no secret.
    pub fn new(marshaler: impl Marshaler<R> + 'static) -> Self {
        Self::from_parts(Arc::new(marshaler), Arc::new(AesGcmCipher), None)
    }

    /// Creates a codec from shared parts.
    ///
    /// An empty secret is treated as no secret.
    pub fn from_parts(
        marshaler: Arc<dyn Marshaler<R>>,
        cipher: Arc<dyn Cipher>,
        secret: Option<Secret>,
    ) -> Self {
        Self {
            marshaler,
            cipher,
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Sets the shared secret.
    #[must_use]
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret).filter(|s| !s.is_empty());
        self
    }

    /// Returns true if records are encrypted at rest.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Serializes a record and, with a secret, encrypts it for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CodecError::Marshal`] or [`crate::CodecError::Encrypt`].
    pub fn encode(&self, id: &str, record: &R) -> CodecResult<Vec<u8>> {
        let data = self.marshaler.marshal(record)?;
        match &self.secret {
            Some(secret) => self.cipher.encrypt(&data, &secret.key_material(id)),
            None => Ok(data),
        }
    }

    /// Reverses [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`crate::CodecError::Decrypt`] when the payload was encrypted
    /// under another secret or id, or when a secret is configured but the
    /// payload is plaintext. Returns [`crate::CodecError::Unmarshal`] when the
    /// bytes are not a valid record.
    pub fn decode(&self, id: &str, data: &[u8]) -> CodecResult<R> {
        match &self.secret {
            Some(secret) => {
                let plain = self.cipher.decrypt(data, &secret.key_material(id))?;
                self.marshaler.unmarshal(&plain)
            }
            None => self.marshaler.unmarshal(data),
        }
    }

    /// Encrypts an already-marshaled payload for `id`.
    ///
    /// Returns `None` when no secret is configured or the payload is already
    /// encrypted. Used to migrate rows written before a secret was set.
    pub fn encrypt_payload(&self, id: &str, data: &[u8]) -> CodecResult<Option<Vec<u8>>> {
        match &self.secret {
            Some(secret) if !self.cipher.is_encrypted(data) => self
                .cipher
                .encrypt(data, &secret.key_material(id))
                .map(Some),
            _ => Ok(None),
        }
    }

    /// Returns true if `data` is an encrypted payload.
    pub fn is_encrypted(&self, data: &[u8]) -> bool {
        self.cipher.is_encrypted(data)
    }
}

impl<R> Clone for RecordCodec<R> {
    fn clone(&self) -> Self {
        Self {
            marshaler: Arc::clone(&self.marshaler),
            cipher: Arc::clone(&self.cipher),
            secret: self.secret.clone(),
        }
    }
}

impl<R> std::fmt::Debug for RecordCodec<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCodec")
            .field("encrypted", &self.has_secret())
            .finish_non_exhaustive()
    }
}
