//! Record identifiers.

use std::borrow::Cow;
use uuid::Uuid;

/// A type that identifies records in a [`crate::SyncTable`].
///
/// Every identifier is stored as a string. The rendering must be stable: the
/// same id must always produce the same key, because the key is the primary
/// key in all three tables and part of the encryption key material.
pub trait RecordKey {
    /// Returns the stored form of this id.
    fn record_key(&self) -> Cow<'_, str>;
}

impl RecordKey for str {
    fn record_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RecordKey for String {
    fn record_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

macro_rules! integer_key {
    ($($t:ty),*) => {
        $(
            impl RecordKey for $t {
                fn record_key(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_key!(i32, i64, u32, u64);

impl RecordKey for Uuid {
    /// Lowercase hyphenated form.
    fn record_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.hyphenated().to_string())
    }
}
