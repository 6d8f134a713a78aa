//! CLI command implementations.

pub mod clean;
pub mod dump;
pub mod encrypt;
pub mod inspect;

use clap::ValueEnum;
use std::path::Path;
use std::sync::Arc;
use syncrow_codec::{CborMarshaler, JsonMarshaler, Secret};
use syncrow_core::{SyncTable, TableOptions};
use syncrow_storage::SqliteStore;

/// Records are handled as untyped JSON values by the CLI.
pub type Record = serde_json::Value;

/// Record serialization the application wrote the rows with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodecKind {
    /// Canonical CBOR.
    Cbor,
    /// JSON.
    Json,
}

/// Which rows to dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpTable {
    /// The remotes table.
    Remotes,
    /// The locals table.
    Locals,
    /// The deletions table.
    Deletions,
    /// Remote rows modified locally since the last server write.
    Updates,
}

/// Opens the store at `path`, refusing to create a new database.
pub fn open_store(path: &Path) -> Result<Arc<SqliteStore>, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No database found at {:?}", path).into());
    }
    Ok(Arc::new(SqliteStore::open(path)?))
}

/// Opens the database at `path` as a table of untyped records.
pub fn open_table(
    path: &Path,
    codec: CodecKind,
    secret: Option<&str>,
) -> Result<SyncTable<Record>, Box<dyn std::error::Error>> {
    let store = open_store(path)?;

    let mut options = match codec {
        CodecKind::Cbor => TableOptions::new(CborMarshaler),
        CodecKind::Json => TableOptions::new(JsonMarshaler),
    };
    if let Some(secret) = secret {
        options = options.secret(Secret::new(secret));
    }

    Ok(SyncTable::open(store, options)?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde_json::json;
    use syncrow_storage::Executor;
    use tempfile::TempDir;

    /// Writes a small database with one row in each table, plus one
    /// pending update and one local draft shadowed by a remote.
    pub fn seeded(codec: CodecKind, secret: Option<&str>) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");
        std::fs::File::create(&path).unwrap();

        let table = open_table(&path, codec, secret).unwrap();
        table.save_remote("a", 1, json!({"title": "alpha"}), 10).unwrap();
        table.save_remote("b", 1, json!({"title": "beta"}), 10).unwrap();
        table.save_remote("c", 2, json!({"title": "gamma"}), 10).unwrap();
        table.update("b", json!({"title": "beta*"})).unwrap();
        table.delete("c").unwrap();
        table.save_local("d", 1, json!({"title": "delta"})).unwrap();

        // Draft left behind by an older client.
        table
            .store()
            .exec(
                "INSERT INTO locals(id, category, data, create_time, update_time)
                 SELECT id, category, data, 0, 0 FROM remotes WHERE id='a'",
                &[],
            )
            .unwrap();

        (dir, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_refuses_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = open_table(&dir.path().join("missing.db"), CodecKind::Cbor, None).unwrap_err();
        assert!(err.to_string().contains("No database found"));
        assert!(!dir.path().join("missing.db").exists());
    }

    #[test]
    fn open_refuses_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(open_store(dir.path()).is_err());
    }
}
