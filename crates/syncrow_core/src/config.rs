//! Table configuration.

use crate::clock::{Clock, SystemClock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use syncrow_codec::{AesGcmCipher, CborMarshaler, Cipher, Marshaler, RecordCodec, Secret};

/// Capacity used for each cache when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Smallest capacity any cache is given, whatever was configured.
pub const MIN_CACHE_CAPACITY: usize = 256;

/// Capacities of the three per-table caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum cached local records.
    pub local_capacity: usize,
    /// Maximum cached remote records.
    pub remote_capacity: usize,
    /// Maximum cached tombstone ids.
    pub deletion_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_capacity: DEFAULT_CACHE_CAPACITY,
            remote_capacity: DEFAULT_CACHE_CAPACITY,
            deletion_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Sets the local cache capacity.
    #[must_use]
    pub const fn local_capacity(mut self, capacity: usize) -> Self {
        self.local_capacity = capacity;
        self
    }

    /// Sets the remote cache capacity.
    #[must_use]
    pub const fn remote_capacity(mut self, capacity: usize) -> Self {
        self.remote_capacity = capacity;
        self
    }

    /// Sets the deletion cache capacity.
    #[must_use]
    pub const fn deletion_capacity(mut self, capacity: usize) -> Self {
        self.deletion_capacity = capacity;
        self
    }

    /// Returns the capacities actually used, with [`MIN_CACHE_CAPACITY`] applied.
    #[must_use]
    pub fn effective(&self) -> Self {
        Self {
            local_capacity: self.local_capacity.max(MIN_CACHE_CAPACITY),
            remote_capacity: self.remote_capacity.max(MIN_CACHE_CAPACITY),
            deletion_capacity: self.deletion_capacity.max(MIN_CACHE_CAPACITY),
        }
    }
}

/// Construction-time options for a [`crate::SyncTable`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use syncrow_codec::{JsonMarshaler, Secret};
/// use syncrow_core::{CacheConfig, ManualClock, TableOptions};
///
/// let options = TableOptions::<Vec<String>>::new(JsonMarshaler)
///     .clock(Arc::new(ManualClock::new(1_700_000_000)))
///     .secret(Secret::new("correct horse"))
///     .cache_config(CacheConfig::default().local_capacity(4096));
/// assert!(options.has_secret());
/// ```
pub struct TableOptions<R> {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) marshaler: Arc<dyn Marshaler<R>>,
    pub(crate) cipher: Arc<dyn Cipher>,
    pub(crate) secret: Option<Secret>,
    pub(crate) cache: CacheConfig,
}

impl<R: Serialize + DeserializeOwned> Default for TableOptions<R> {
    /// CBOR records, the system clock, no encryption, default cache sizes.
    fn default() -> Self {
        Self::new(CborMarshaler)
    }
}

impl<R> TableOptions<R> {
    /// Creates options for a record type with the given marshaler.
    pub fn new(marshaler: impl Marshaler<R> + 'static) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            marshaler: Arc::new(marshaler),
            cipher: Arc::new(AesGcmCipher),
            secret: None,
            cache: CacheConfig::default(),
        }
    }

    /// Sets the clock used for local and tombstone timestamps.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the record marshaler.
    #[must_use]
    pub fn marshaler(mut self, marshaler: impl Marshaler<R> + 'static) -> Self {
        self.marshaler = Arc::new(marshaler);
        self
    }

    /// Replaces the cipher used when a secret is set.
    #[must_use]
    pub fn cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.cipher = Arc::new(cipher);
        self
    }

    /// Encrypts stored records under `secret`. An empty secret disables encryption.
    #[must_use]
    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret).filter(|s| !s.is_empty());
        self
    }

    /// Sets all cache capacities.
    #[must_use]
    pub fn cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Returns true if records will be encrypted at rest.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub(crate) fn codec(&self) -> RecordCodec<R> {
        RecordCodec::from_parts(
            Arc::clone(&self.marshaler),
            Arc::clone(&self.cipher),
            self.secret.clone(),
        )
    }
}

impl<R> std::fmt::Debug for TableOptions<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableOptions")
            .field("encrypted", &self.has_secret())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncrow_codec::{CodecError, CodecResult};

    #[test]
    fn default_cache_config() {
        let config = CacheConfig::default();
        assert_eq!(config.local_capacity, 1024);
        assert_eq!(config.remote_capacity, 1024);
        assert_eq!(config.deletion_capacity, 1024);
        assert_eq!(config.effective(), config);
    }

    #[test]
    fn effective_applies_floor() {
        let config = CacheConfig::default()
            .local_capacity(0)
            .remote_capacity(255)
            .deletion_capacity(257)
            .effective();

        assert_eq!(config.local_capacity, MIN_CACHE_CAPACITY);
        assert_eq!(config.remote_capacity, MIN_CACHE_CAPACITY);
        assert_eq!(config.deletion_capacity, 257);
    }

    #[test]
    fn empty_secret_is_ignored() {
        let options = TableOptions::<String>::default().secret(Secret::new(""));
        assert!(!options.has_secret());
        assert!(!options.codec().has_secret());

        let options = options.secret(Secret::new("pw"));
        assert!(options.codec().has_secret());
    }

    /// Prefixes payloads with a marker byte and the key material length.
    struct Marked;

    impl Cipher for Marked {
        fn encrypt(&self, plaintext: &[u8], key_material: &[u8]) -> CodecResult<Vec<u8>> {
            let mut out = vec![0xEE, key_material.len() as u8];
            out.extend_from_slice(plaintext);
            Ok(out)
        }

        fn decrypt(&self, ciphertext: &[u8], _key_material: &[u8]) -> CodecResult<Vec<u8>> {
            match ciphertext {
                [0xEE, _, rest @ ..] => Ok(rest.to_vec()),
                _ => Err(CodecError::decrypt("missing marker")),
            }
        }

        fn is_encrypted(&self, data: &[u8]) -> bool {
            data.first() == Some(&0xEE)
        }
    }

    #[test]
    fn custom_cipher_reaches_codec() {
        let codec = TableOptions::<String>::default()
            .cipher(Marked)
            .secret(Secret::new("pw"))
            .codec();

        let bytes = codec.encode("ab", &"note".to_string()).unwrap();
        // "pw" + "ab"
        assert_eq!(&bytes[..2], &[0xEE, 4]);
        assert!(codec.is_encrypted(&bytes));
        assert_eq!(codec.decode("ab", &bytes).unwrap(), "note");
    }

    #[test]
    fn debug_hides_secret() {
        let options = TableOptions::<String>::default().secret(Secret::new("hunter2"));
        let shown = format!("{options:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("encrypted: true"));
    }
}
