//! Statement arguments and result rows.

use crate::error::{StorageError, StorageResult};

/// A single SQL value, used both as a bound argument and as a result column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Opaque bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the SQL type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row. Columns are addressed by their position in the `SELECT` list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from column values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw value at `index`.
    pub fn get(&self, index: usize) -> StorageResult<&Value> {
        self.values.get(index).ok_or(StorageError::ColumnIndex {
            index,
            len: self.values.len(),
        })
    }

    /// Returns the column as text.
    pub fn text(&self, index: usize) -> StorageResult<&str> {
        match self.get(index)? {
            Value::Text(s) => Ok(s),
            other => Err(StorageError::column_type(index, "text", other.type_name())),
        }
    }

    /// Returns the column as bytes. `NULL` reads as an empty slice.
    pub fn blob(&self, index: usize) -> StorageResult<&[u8]> {
        match self.get(index)? {
            Value::Blob(b) => Ok(b),
            Value::Text(s) => Ok(s.as_bytes()),
            Value::Null => Ok(&[]),
            other => Err(StorageError::column_type(index, "blob", other.type_name())),
        }
    }

    /// Returns the column as an integer. `NULL` reads as zero.
    pub fn integer(&self, index: usize) -> StorageResult<i64> {
        match self.get(index)? {
            Value::Integer(v) => Ok(*v),
            Value::Null => Ok(0),
            other => Err(StorageError::column_type(index, "integer", other.type_name())),
        }
    }

    /// Returns the column as a boolean (any non-zero integer is true).
    pub fn boolean(&self, index: usize) -> StorageResult<bool> {
        self.integer(index).map(|v| v != 0)
    }

    /// Consumes the row and returns its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(7i64), Value::Integer(7));
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Blob(vec![1, 2]));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("y")), Value::Text("y".into()));
    }

    #[test]
    fn typed_accessors() {
        let row = Row::new(vec![
            Value::Text("id".into()),
            Value::Blob(vec![9]),
            Value::Integer(0),
            Value::Null,
        ]);

        assert_eq!(row.text(0).unwrap(), "id");
        assert_eq!(row.blob(1).unwrap(), &[9]);
        assert!(!row.boolean(2).unwrap());
        assert_eq!(row.integer(3).unwrap(), 0);
        assert!(row.blob(3).unwrap().is_empty());
    }

    #[test]
    fn accessor_errors() {
        let row = Row::new(vec![Value::Integer(1)]);

        assert!(matches!(
            row.text(0),
            Err(StorageError::ColumnType { expected: "text", found: "integer", .. })
        ));
        assert!(matches!(
            row.get(3),
            Err(StorageError::ColumnIndex { index: 3, len: 1 })
        ));
    }
}
