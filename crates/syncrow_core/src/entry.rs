//! Entries returned by the metadata listings.
//!
//! Plain listings such as [`crate::SyncTable::list_remotes`] return bare
//! records. The `*_entries` listings return these types instead, so a push
//! layer can see which id and timestamp each record belongs to.

use serde::Serialize;

/// A row of the remotes table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteEntry<R> {
    /// Stored record id.
    pub id: String,
    /// Grouping tag.
    pub category: i64,
    /// The decoded record.
    pub record: R,
    /// Server timestamp of the last accepted write, or local time of the last update.
    pub update_time: i64,
    /// False once the record has been modified locally after confirmation.
    pub synced: bool,
}

/// A row of the locals table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalEntry<R> {
    /// Stored record id.
    pub id: String,
    /// Grouping tag.
    pub category: i64,
    /// The decoded record.
    pub record: R,
    /// When the record was first saved locally.
    pub create_time: i64,
    /// When the record was last saved or updated locally.
    pub update_time: i64,
}

/// A tombstone: the last remote state of a record deleted on this client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deletion<R> {
    /// Stored record id.
    pub id: String,
    /// Grouping tag.
    pub category: i64,
    /// The record as it was before deletion.
    pub record: R,
    /// When the record was deleted.
    pub delete_time: i64,
}
