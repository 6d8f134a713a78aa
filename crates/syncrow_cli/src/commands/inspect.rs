//! Inspect command implementation.

use super::open_store;
use serde::Serialize;
use std::path::Path;
use syncrow_core::TableStats;
use tracing::info;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Row counts.
    #[serde(flatten)]
    pub stats: TableStats,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path)?;
    info!(path = %result.path, "inspected database");

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects the inspection result without printing it.
pub fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let stats = TableStats::collect(&*store)?;

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        stats,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("syncrow Database Inspection");
    println!("===========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_bytes(result.file_size));
    println!();
    println!("Tables:");
    println!("  Remotes:         {}", result.stats.remotes);
    println!("  Pending updates: {}", result.stats.pending_updates);
    println!("  Locals:          {}", result.stats.locals);
    println!("  Deletions:       {}", result.stats.deletions);
    println!();
    println!("Live records: {}", result.stats.live());
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded;
    use crate::commands::CodecKind;

    #[test]
    fn counts_seeded_rows() {
        let (_dir, path) = seeded(CodecKind::Cbor, None);
        let result = inspect(&path).unwrap();

        assert_eq!(result.stats.remotes, 2);
        assert_eq!(result.stats.pending_updates, 1);
        assert_eq!(result.stats.locals, 2);
        assert_eq!(result.stats.deletions, 1);
    }

    #[test]
    fn json_output_is_flat() {
        let (_dir, path) = seeded(CodecKind::Cbor, None);
        let value = serde_json::to_value(inspect(&path).unwrap()).unwrap();
        assert_eq!(value["remotes"], 2);
        assert_eq!(value["deletions"], 1);
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
