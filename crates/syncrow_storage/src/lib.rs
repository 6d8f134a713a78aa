//! # syncrow storage
//!
//! The relational store that backs a syncrow table.
//!
//! Stores are deliberately small: they execute parameterized statements and
//! return rows of loosely typed [`Value`]s. They know nothing about records,
//! encryption, or the remote/local/deletion tables built on top of them.
//!
//! ## Design Principles
//!
//! - Every argument is bound through a `?` placeholder, never interpolated
//! - Stores must be `Send + Sync`; callers may share one store across threads
//! - Transactions are optional; [`Store::supports_transactions`] says whether
//!   [`Store::transaction`] is really atomic
//!
//! ## Available Stores
//!
//! - [`SqliteStore`] - SQLite via rusqlite, file-backed or in-memory
//!
//! ## Example
//!
//! ```rust
//! use syncrow_storage::{Executor, SqliteStore, Value};
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! store.exec("CREATE TABLE kv(k VARCHAR PRIMARY KEY, v BLOB)", &[]).unwrap();
//! store.exec("INSERT INTO kv(k, v) VALUES(?, ?)", &["a".into(), b"1".as_slice().into()]).unwrap();
//! let row = store.query_row("SELECT v FROM kv WHERE k=?", &[Value::from("a")]).unwrap();
//! assert_eq!(row.unwrap().blob(0).unwrap(), b"1");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod sqlite;
mod store;
mod value;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;
pub use store::{Executor, Store};
pub use value::{Row, Value};
