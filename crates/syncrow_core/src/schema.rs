//! Persisted table layout.
//!
//! ```text
//! remotes  (id PK, category INT, data BLOB, update_time INT, synced BOOL)
//! locals   (id PK, category INT, data BLOB, create_time INT, update_time INT)
//! deletions(id PK, category INT, data BLOB, delete_time INT)
//! ```

use std::fmt;
use syncrow_storage::{Executor, StorageResult};

/// One of the three persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Records confirmed by, or pending re-push to, the server.
    Remotes,
    /// Records that exist only on this client.
    Locals,
    /// Tombstones of deleted remote records.
    Deletions,
}

impl TableKind {
    /// All tables, in the order they are created.
    pub const ALL: [TableKind; 3] = [TableKind::Remotes, TableKind::Locals, TableKind::Deletions];

    /// Returns the SQL table name.
    pub const fn name(self) -> &'static str {
        match self {
            TableKind::Remotes => "remotes",
            TableKind::Locals => "locals",
            TableKind::Deletions => "deletions",
        }
    }

    const fn ddl(self) -> &'static str {
        match self {
            TableKind::Remotes => {
                "CREATE TABLE IF NOT EXISTS remotes(
                    id VARCHAR PRIMARY KEY,
                    category INTEGER DEFAULT 0,
                    data BLOB,
                    update_time INTEGER,
                    synced BOOL DEFAULT FALSE
                )"
            }
            TableKind::Locals => {
                "CREATE TABLE IF NOT EXISTS locals(
                    id VARCHAR PRIMARY KEY,
                    category INTEGER DEFAULT 0,
                    data BLOB,
                    create_time INTEGER,
                    update_time INTEGER
                )"
            }
            TableKind::Deletions => {
                "CREATE TABLE IF NOT EXISTS deletions(
                    id VARCHAR PRIMARY KEY,
                    category INTEGER DEFAULT 0,
                    data BLOB,
                    delete_time INTEGER
                )"
            }
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Creates any of the three tables that do not exist yet.
///
/// # Errors
///
/// Returns the first statement failure.
pub fn create_schema<E: Executor + ?Sized>(exec: &E) -> StorageResult<()> {
    for table in TableKind::ALL {
        exec.exec(table.ddl(), &[])?;
    }
    Ok(())
}
