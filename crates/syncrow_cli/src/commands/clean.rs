//! Clean command implementation.

use super::{open_table, CodecKind};
use std::path::Path;
use tracing::info;

/// Runs the clean command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let removed = clean(path)?;
    info!(rows = removed, "clean complete");
    println!("Removed {} shadowed local draft(s)", removed);
    Ok(())
}

/// Deletes local drafts whose id has a remote entry.
pub fn clean(path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    // Rows are not decoded, so the codec does not matter.
    let table = open_table(path, CodecKind::Cbor, None)?;
    Ok(table.clean_locals()?)
}
