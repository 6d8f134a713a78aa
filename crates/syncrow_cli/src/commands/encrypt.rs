//! Encrypt command implementation.

use super::{open_table, CodecKind};
use std::path::Path;
use tracing::info;

/// Runs the encrypt command.
///
/// Rows that are already encrypted are left alone, so the command can be
/// rerun safely.
pub fn run(path: &Path, secret: &str, codec: CodecKind) -> Result<(), Box<dyn std::error::Error>> {
    let encrypted = encrypt(path, secret, codec)?;
    info!(rows = encrypted, "encryption complete");
    println!("Encrypted {} row(s)", encrypted);
    Ok(())
}

/// Encrypts plaintext rows, returning how many were rewritten.
pub fn encrypt(
    path: &Path,
    secret: &str,
    codec: CodecKind,
) -> Result<usize, Box<dyn std::error::Error>> {
    if secret.is_empty() {
        return Err("Secret must not be empty".into());
    }
    let table = open_table(path, codec, Some(secret))?;
    Ok(table.encrypt_plain_data()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dump::render;
    use crate::commands::test_support::seeded;
    use crate::commands::DumpTable;

    #[test]
    fn encrypts_once() {
        let (_dir, path) = seeded(CodecKind::Json, None);

        // 2 remotes, 2 locals, 1 deletion.
        assert_eq!(encrypt(&path, "k", CodecKind::Json).unwrap(), 5);
        assert_eq!(encrypt(&path, "k", CodecKind::Json).unwrap(), 0);

        let table = open_table(&path, CodecKind::Json, Some("k")).unwrap();
        assert_eq!(render(&table, DumpTable::Locals, None).unwrap().len(), 2);

        let plain = open_table(&path, CodecKind::Json, None).unwrap();
        assert!(render(&plain, DumpTable::Remotes, None).is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        let (_dir, path) = seeded(CodecKind::Json, None);
        assert!(encrypt(&path, "", CodecKind::Json).is_err());
    }
}
