//! Record serialization.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes records of type `R` to bytes and back.
///
/// Implementations must be deterministic enough that
/// `unmarshal(marshal(r)) == r` for every record they accept.
pub trait Marshaler<R>: Send + Sync {
    /// Serializes a record.
    fn marshal(&self, record: &R) -> CodecResult<Vec<u8>>;

    /// Deserializes a record.
    fn unmarshal(&self, data: &[u8]) -> CodecResult<R>;
}

/// CBOR via serde. This is the default marshaler.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborMarshaler;

impl<R: Serialize + DeserializeOwned> Marshaler<R> for CborMarshaler {
    fn marshal(&self, record: &R) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(record, &mut buf).map_err(CodecError::marshal)?;
        Ok(buf)
    }

    fn unmarshal(&self, data: &[u8]) -> CodecResult<R> {
        ciborium::from_reader(data).map_err(CodecError::unmarshal)
    }
}

/// JSON via serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaler;

impl<R: Serialize + DeserializeOwned> Marshaler<R> for JsonMarshaler {
    fn marshal(&self, record: &R) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(record).map_err(CodecError::marshal)
    }

    fn unmarshal(&self, data: &[u8]) -> CodecResult<R> {
        serde_json::from_slice(data).map_err(CodecError::unmarshal)
    }
}

/// A marshaler assembled from two closures, for record types without serde.
///
/// ```rust
/// use syncrow_codec::{CodecError, CodecResult, FnMarshaler, Marshaler};
///
/// let m = FnMarshaler::new(
///     |n: &u64| -> CodecResult<Vec<u8>> { Ok(n.to_be_bytes().to_vec()) },
///     |b: &[u8]| -> CodecResult<u64> {
///         let arr: [u8; 8] = b.try_into().map_err(CodecError::unmarshal)?;
///         Ok(u64::from_be_bytes(arr))
///     },
/// );
/// assert_eq!(m.unmarshal(&m.marshal(&7).unwrap()).unwrap(), 7);
/// ```
pub struct FnMarshaler<M, U> {
    marshal: M,
    unmarshal: U,
}

impl<M, U> FnMarshaler<M, U> {
    /// Creates a marshaler from a serialize and a deserialize function.
    pub fn new(marshal: M, unmarshal: U) -> Self {
        Self { marshal, unmarshal }
    }
}

impl<R, M, U> Marshaler<R> for FnMarshaler<M, U>
where
    M: Fn(&R) -> CodecResult<Vec<u8>> + Send + Sync,
    U: Fn(&[u8]) -> CodecResult<R> + Send + Sync,
{
    fn marshal(&self, record: &R) -> CodecResult<Vec<u8>> {
        (self.marshal)(record)
    }

    fn unmarshal(&self, data: &[u8]) -> CodecResult<R> {
        (self.unmarshal)(data)
    }
}

impl<M, U> std::fmt::Debug for FnMarshaler<M, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMarshaler").finish_non_exhaustive()
    }
}
