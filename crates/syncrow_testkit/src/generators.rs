//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records, ids and whole operation
//! sequences that can be replayed against a [`TestTable`].

use crate::fixtures::{Note, TestTable};
use proptest::prelude::*;
use syncrow_core::{CoreError, CoreResult};

/// Strategy for generating record ids.
pub fn record_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9][a-z0-9-]{0,15}").expect("Invalid regex")
}

/// Strategy for picking one of a small, fixed set of ids.
///
/// Operation sequences over few ids collide often, which is where the
/// reconciliation rules matter.
pub fn small_id_strategy() -> impl Strategy<Value = String> {
    (0u8..4).prop_map(|n| format!("id-{}", n))
}

/// Strategy for generating categories.
pub fn category_strategy() -> impl Strategy<Value = i64> {
    0i64..4
}

/// Strategy for generating server timestamps.
pub fn timestamp_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000
}

/// Strategy for generating notes.
pub fn note_strategy() -> impl Strategy<Value = Note> {
    (
        prop::string::string_regex("[A-Za-z ]{0,24}").expect("Invalid regex"),
        ".{0,64}",
        any::<bool>(),
    )
        .prop_map(|(title, body, pinned)| Note {
            title,
            body,
            pinned,
        })
}

/// Strategy for generating non-empty secrets.
pub fn secret_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{1,32}").expect("Invalid regex")
}

/// One mutation of a table.
#[derive(Debug, Clone)]
pub enum TableOp {
    /// A record delivered by the server.
    SaveRemote {
        /// Record id.
        id: String,
        /// Grouping tag.
        category: i64,
        /// Payload.
        note: Note,
        /// Server timestamp.
        update_time: i64,
    },
    /// A record created on this client.
    SaveLocal {
        /// Record id.
        id: String,
        /// Grouping tag.
        category: i64,
        /// Payload.
        note: Note,
    },
    /// A local edit of an existing record.
    Update {
        /// Record id.
        id: String,
        /// Payload.
        note: Note,
    },
    /// A local deletion.
    Delete {
        /// Record id.
        id: String,
    },
    /// Time passing between operations.
    Tick {
        /// Seconds to advance the clock by.
        secs: i64,
    },
}

impl TableOp {
    /// Applies the operation.
    ///
    /// [`CoreError::NotFound`] from an update of a missing id is expected
    /// in random sequences and is swallowed.
    ///
    /// # Errors
    ///
    /// Returns any other error from the table.
    pub fn apply(&self, table: &TestTable) -> CoreResult<()> {
        let result = match self {
            TableOp::SaveRemote {
                id,
                category,
                note,
                update_time,
            } => table.save_remote(id.as_str(), *category, note.clone(), *update_time),
            TableOp::SaveLocal { id, category, note } => {
                table.save_local(id.as_str(), *category, note.clone())
            }
            TableOp::Update { id, note } => table.update(id.as_str(), note.clone()),
            TableOp::Delete { id } => table.delete(id.as_str()),
            TableOp::Tick { secs } => {
                table.advance(*secs);
                Ok(())
            }
        };
        match result {
            Err(CoreError::NotFound { .. }) => Ok(()),
            other => other,
        }
    }
}

/// Strategy for generating a single operation over [`small_id_strategy`] ids.
pub fn table_op_strategy() -> impl Strategy<Value = TableOp> {
    prop_oneof![
        3 => (small_id_strategy(), category_strategy(), note_strategy(), timestamp_strategy())
            .prop_map(|(id, category, note, update_time)| TableOp::SaveRemote {
                id,
                category,
                note,
                update_time,
            }),
        3 => (small_id_strategy(), category_strategy(), note_strategy())
            .prop_map(|(id, category, note)| TableOp::SaveLocal { id, category, note }),
        2 => (small_id_strategy(), note_strategy())
            .prop_map(|(id, note)| TableOp::Update { id, note }),
        2 => small_id_strategy().prop_map(|id| TableOp::Delete { id }),
        1 => (1i64..500).prop_map(|secs| TableOp::Tick { secs }),
    ]
}

/// Strategy for generating operation sequences.
pub fn table_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<TableOp>> {
    prop::collection::vec(table_op_strategy(), 0..max_len)
}
