//! At-rest encryption using AES-256-GCM.
//!
//! ## Envelope
//!
//! `magic (4 bytes) || nonce (12 bytes) || ciphertext || tag (16 bytes)`
//!
//! The magic starts with `0xFF`, a byte that can never begin a CBOR item or a
//! JSON document, which is how [`Cipher::is_encrypted`] tells rows apart.
//!
//! ## Keys
//!
//! The AES key is derived with HKDF-SHA256 from the caller's key material.
//! [`crate::RecordCodec`] passes `secret || record id`, so every record gets its
//! own key. Changing the salt, info string, or concatenation order makes
//! existing rows unreadable.

use crate::error::{CodecError, CodecResult};
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// Prefix that marks an encrypted payload.
pub const MAGIC: [u8; 4] = [0xFF, b'S', b'R', 0x01];

const KDF_SALT: &[u8] = b"syncrow-record-salt-v1";
const KDF_INFO: &[u8] = b"syncrow-record-key-v1";

/// Encrypts and decrypts row payloads.
pub trait Cipher: Send + Sync {
    /// Encrypts `plaintext` with a key derived from `key_material`.
    fn encrypt(&self, plaintext: &[u8], key_material: &[u8]) -> CodecResult<Vec<u8>>;

    /// Decrypts data produced by [`encrypt`](Self::encrypt) with the same key material.
    ///
    /// # Errors
    ///
    /// Fails if the data is not an encrypted payload, or if authentication
    /// fails (wrong key material, corrupted bytes).
    fn decrypt(&self, ciphertext: &[u8], key_material: &[u8]) -> CodecResult<Vec<u8>>;

    /// Returns true if `data` looks like a payload produced by this cipher.
    fn is_encrypted(&self, data: &[u8]) -> bool;
}

/// The default [`Cipher`]: HKDF-SHA256 key derivation and AES-256-GCM.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl AesGcmCipher {
    fn cipher_for(key_material: &[u8]) -> CodecResult<Aes256Gcm> {
        let hk = Hkdf::<Sha256>::new(Some(KDF_SALT), key_material);
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        hk.expand(KDF_INFO, &mut key[..])
            .map_err(|_| CodecError::encrypt("HKDF expand failed"))?;
        Ok(Aes256Gcm::new(GenericArray::from_slice(&key[..])))
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8], key_material: &[u8]) -> CodecResult<Vec<u8>> {
        let cipher = Self::cipher_for(key_material)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CodecError::encrypt("AES-GCM seal failed"))?;

        let mut out = Vec::with_capacity(MAGIC.len() + NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&nonce_bytes);
        out.extend(ciphertext);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], key_material: &[u8]) -> CodecResult<Vec<u8>> {
        if !self.is_encrypted(ciphertext) {
            return Err(CodecError::decrypt("payload is not encrypted"));
        }

        let body = &ciphertext[MAGIC.len()..];
        let nonce = Nonce::from_slice(&body[..NONCE_SIZE]);
        let cipher = Self::cipher_for(key_material)?;
        cipher
            .decrypt(nonce, &body[NONCE_SIZE..])
            .map_err(|_| CodecError::decrypt("authentication failed"))
    }

    fn is_encrypted(&self, data: &[u8]) -> bool {
        data.len() >= MAGIC.len() + NONCE_SIZE + TAG_SIZE && data.starts_with(&MAGIC)
    }
}

/// The shared secret records are encrypted under.
///
/// The secret is zeroized on drop and never printed.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wraps a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Returns true if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key material for one record: the secret bytes followed by the id bytes.
    pub fn key_material(&self, id: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(self.0.len() + id.len()));
        material.extend_from_slice(self.0.as_bytes());
        material.extend_from_slice(id.as_bytes());
        material
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}
