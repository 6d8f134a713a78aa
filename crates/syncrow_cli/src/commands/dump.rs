//! Dump command implementation.

use super::{open_table, CodecKind, DumpTable, Record};
use serde::Serialize;
use std::path::Path;
use syncrow_core::SyncTable;
use tracing::info;

/// Runs the dump command, printing one JSON object per row.
pub fn run(
    path: &Path,
    table: DumpTable,
    codec: CodecKind,
    secret: Option<&str>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync_table = open_table(path, codec, secret)?;
    let lines = render(&sync_table, table, limit)?;

    for line in &lines {
        println!("{}", line);
    }

    info!(table = ?table, rows = lines.len(), "dump complete");
    Ok(())
}

/// Renders the rows of `table` as JSON lines, ordered by id.
pub fn render(
    sync_table: &SyncTable<Record>,
    table: DumpTable,
    limit: Option<usize>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let limit = limit.unwrap_or(usize::MAX);

    match table {
        DumpTable::Remotes => to_lines(sync_table.remote_entries()?, limit),
        DumpTable::Updates => to_lines(sync_table.update_entries()?, limit),
        DumpTable::Locals => to_lines(sync_table.local_entries()?, limit),
        DumpTable::Deletions => to_lines(sync_table.deletion_entries()?, limit),
    }
}

fn to_lines<T: Serialize>(
    entries: Vec<T>,
    limit: usize,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    entries
        .iter()
        .take(limit)
        .map(|entry| serde_json::to_string(entry).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded;
    use serde_json::Value;

    fn dump(path: &Path, table: DumpTable, codec: CodecKind, secret: Option<&str>) -> Vec<Value> {
        let sync_table = open_table(path, codec, secret).unwrap();
        render(&sync_table, table, None)
            .unwrap()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn dumps_each_table() {
        let (_dir, path) = seeded(CodecKind::Cbor, None);

        let remotes = dump(&path, DumpTable::Remotes, CodecKind::Cbor, None);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[0]["id"], "a");
        assert_eq!(remotes[0]["record"]["title"], "alpha");
        assert_eq!(remotes[0]["synced"], true);
        assert_eq!(remotes[1]["record"]["title"], "beta*");

        let updates = dump(&path, DumpTable::Updates, CodecKind::Cbor, None);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["id"], "b");

        let locals = dump(&path, DumpTable::Locals, CodecKind::Cbor, None);
        let ids: Vec<_> = locals.iter().map(|l| l["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["a", "d"]);

        let deletions = dump(&path, DumpTable::Deletions, CodecKind::Cbor, None);
        assert_eq!(deletions.len(), 1);
        assert_eq!(deletions[0]["record"]["title"], "gamma");
        assert_eq!(deletions[0]["category"], 2);
    }

    #[test]
    fn limit_truncates() {
        let (_dir, path) = seeded(CodecKind::Json, None);
        let sync_table = open_table(&path, CodecKind::Json, None).unwrap();
        let lines = render(&sync_table, DumpTable::Remotes, Some(1)).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"alpha\""));
    }

    #[test]
    fn encrypted_rows_need_the_secret() {
        let (_dir, path) = seeded(CodecKind::Cbor, Some("hunter2"));

        let sync_table = open_table(&path, CodecKind::Cbor, None).unwrap();
        assert!(render(&sync_table, DumpTable::Remotes, None).is_err());

        let remotes = dump(&path, DumpTable::Remotes, CodecKind::Cbor, Some("hunter2"));
        assert_eq!(remotes[0]["record"]["title"], "alpha");
    }
}
