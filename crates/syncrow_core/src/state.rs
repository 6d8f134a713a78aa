//! Per-id lifecycle state.

use std::fmt;

/// Where a record id currently sits in its lifecycle.
///
/// ```text
/// Absent --save_local--> Local --save_remote--> Remote --update_remote--> RemoteDirty
/// Absent --save_remote--> Remote        RemoteDirty --save_remote--> Remote
/// Remote | RemoteDirty --delete--> Tombstoned --remove_deletions--> Absent
/// Local --delete--> Absent              Tombstoned --save_remote--> Tombstoned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// No row in any table.
    Absent,
    /// Only a local draft exists.
    Local,
    /// A remote entry matching the server.
    Remote,
    /// A remote entry modified locally and awaiting re-push.
    RemoteDirty,
    /// Deleted locally after being remote; server writes are suppressed.
    Tombstoned,
}

impl RecordState {
    /// Returns true if [`crate::SyncTable::get`] would find the record.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Local | Self::Remote | Self::RemoteDirty)
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Local => "local",
            Self::Remote => "remote",
            Self::RemoteDirty => "remote-dirty",
            Self::Tombstoned => "tombstoned",
        })
    }
}
