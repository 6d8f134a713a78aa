//! # syncrow core
//!
//! Local-first synchronized record tables.
//!
//! A [`SyncTable`] lets a client create, change and delete typed records
//! before the server has seen them, then reconciles those records with
//! authoritative server state that arrives later and possibly out of order.
//!
//! This crate provides:
//! - [`SyncTable`] with its remote, local and deletion tables
//! - Bounded LRU caches in front of each table ([`TableCaches`])
//! - Per-record at-rest encryption through [`syncrow_codec::RecordCodec`]
//! - A [`Clock`] abstraction so timestamps are testable
//!
//! It does not move data over the network or decide when to sync.
//!
//! ## Reconciliation rules
//!
//! - A remote write older than the stored remote entry is ignored
//! - A remote write for an id with a tombstone is ignored
//! - An accepted remote write purges the id's local draft if the draft is
//!   not newer than the write
//! - Reads always prefer the remote entry
//!
//! Ignored writes are not errors; they are reported at `debug` level.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod clock;
mod config;
mod entry;
mod error;
mod key;
mod migration;
mod schema;
mod state;
mod stats;
mod table;

pub use cache::{RecordCache, TableCaches};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, TableOptions, DEFAULT_CACHE_CAPACITY, MIN_CACHE_CAPACITY};
pub use entry::{Deletion, LocalEntry, RemoteEntry};
pub use error::{CoreError, CoreResult};
pub use key::RecordKey;
pub use schema::{create_schema, TableKind};
pub use state::RecordState;
pub use stats::TableStats;
pub use table::SyncTable;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
