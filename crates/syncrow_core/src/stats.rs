//! Row counts per table.

use serde::Serialize;
use syncrow_storage::{Executor, StorageResult};

/// Row counts of a table's three stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Rows in `remotes`.
    pub remotes: u64,
    /// Rows in `remotes` with `synced=0`, awaiting re-push.
    pub pending_updates: u64,
    /// Rows in `locals`.
    pub locals: u64,
    /// Rows in `deletions`.
    pub deletions: u64,
}

impl TableStats {
    /// Counts rows directly, without a record type.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables do not exist or the query fails.
    pub fn collect<E: Executor + ?Sized>(exec: &E) -> StorageResult<Self> {
        let row = exec.query_row(
            "SELECT
                (SELECT COUNT(*) FROM remotes),
                (SELECT COUNT(*) FROM remotes WHERE synced=0),
                (SELECT COUNT(*) FROM locals),
                (SELECT COUNT(*) FROM deletions)",
            &[],
        )?;
        let Some(row) = row else {
            return Ok(Self::default());
        };

        let count = |index| -> StorageResult<u64> {
            Ok(u64::try_from(row.integer(index)?).unwrap_or_default())
        };
        Ok(Self {
            remotes: count(0)?,
            pending_updates: count(1)?,
            locals: count(2)?,
            deletions: count(3)?,
        })
    }

    /// Records the table knows about: remotes plus locals.
    ///
    /// An id with both a remote and a local row counts twice.
    pub fn live(&self) -> u64 {
        self.remotes + self.locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::create_schema;
    use syncrow_storage::SqliteStore;

    #[test]
    fn counts_each_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_schema(&store).unwrap();
        store
            .exec(
                "INSERT INTO remotes(id, update_time, synced) VALUES('a', 1, 1), ('b', 1, 0)",
                &[],
            )
            .unwrap();
        store.exec("INSERT INTO locals(id) VALUES('c')", &[]).unwrap();

        let stats = TableStats::collect(&store).unwrap();
        assert_eq!(
            stats,
            TableStats {
                remotes: 2,
                pending_updates: 1,
                locals: 1,
                deletions: 0,
            }
        );
        assert_eq!(stats.live(), 3);
    }

    #[test]
    fn missing_schema_is_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(TableStats::collect(&store).is_err());
    }
}
