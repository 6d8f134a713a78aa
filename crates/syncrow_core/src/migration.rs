//! Encryption of rows written before a secret was configured.

use crate::error::{CoreError, CoreResult, StoreContext};
use crate::schema::TableKind;
use syncrow_codec::RecordCodec;
use syncrow_storage::{Store, Value};
use tracing::debug;

const OP: &str = "encrypt_plain_data";

/// Encrypts every plaintext payload in `table` and returns how many rows changed.
///
/// Already encrypted rows are skipped, so running this twice is harmless. All
/// rewrites for one table are committed together.
pub(crate) fn encrypt_table<R>(
    store: &dyn Store,
    codec: &RecordCodec<R>,
    table: TableKind,
) -> CoreResult<usize> {
    let select = format!("SELECT id, data FROM {} ORDER BY id", table.name());
    let rows = store.query(&select, &[]).context(OP, table.name())?;

    let mut rewrites = Vec::new();
    for row in rows {
        let id = row.text(0).context(OP, table.name())?;
        let data = row.blob(1).context(OP, table.name())?;
        if let Some(sealed) = codec
            .encrypt_payload(id, data)
            .map_err(|e| CoreError::encode(id, e))?
        {
            rewrites.push((id.to_owned(), sealed));
        }
    }

    if rewrites.is_empty() {
        return Ok(0);
    }

    let update = format!("UPDATE {} SET data=? WHERE id=?", table.name());
    store
        .transaction(&mut |tx| {
            for (id, sealed) in &rewrites {
                tx.exec(&update, &[Value::Blob(sealed.clone()), id.as_str().into()])?;
            }
            Ok(())
        })
        .context(OP, table.name())?;

    for (id, _) in &rewrites {
        debug!(table = table.name(), id = %id, "encrypted plaintext row");
    }
    Ok(rewrites.len())
}
