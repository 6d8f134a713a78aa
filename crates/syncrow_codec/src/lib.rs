//! # syncrow codec
//!
//! Turns records into the bytes stored in a table row, and back.
//!
//! Encoding happens in two stages:
//!
//! 1. a [`Marshaler`] serializes the record (canonical CBOR by default);
//! 2. when a [`Secret`] is configured, a [`Cipher`] encrypts the bytes with a
//!    key derived from the secret concatenated with the record id.
//!
//! Step 2 means two records never share an effective key, even though the
//! application only manages one secret.
//!
//! ## Example
//!
//! ```rust
//! use syncrow_codec::{CborMarshaler, RecordCodec, Secret};
//!
//! let codec = RecordCodec::<Vec<u32>>::new(CborMarshaler).with_secret(Secret::new("s3cr3t"));
//! let bytes = codec.encode("note-1", &vec![1, 2, 3]).unwrap();
//! assert!(codec.is_encrypted(&bytes));
//! assert_eq!(codec.decode("note-1", &bytes).unwrap(), vec![1, 2, 3]);
//! assert!(codec.decode("note-2", &bytes).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod codec;
mod error;
mod marshal;

pub use cipher::{AesGcmCipher, Cipher, Secret, KEY_SIZE, MAGIC, NONCE_SIZE, TAG_SIZE};
pub use codec::RecordCodec;
pub use error::{CodecError, CodecResult};
pub use marshal::{CborMarshaler, FnMarshaler, JsonMarshaler, Marshaler};
