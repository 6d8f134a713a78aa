//! Lookups and listings.

use super::{category_filter, placeholders, SyncTable, MAX_BATCH};
use crate::entry::{Deletion, LocalEntry, RemoteEntry};
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::key::RecordKey;
use crate::schema::TableKind;
use std::collections::BTreeMap;
use syncrow_storage::Value;
use tracing::debug;

impl<R, K> SyncTable<R, K>
where
    R: Clone,
    K: RecordKey + ?Sized,
{
    /// Returns the record for `id`, preferring the remote entry.
    ///
    /// Checks the remote cache, the local cache, the remotes table and then
    /// the locals table. A local cache hit is only returned once the id is
    /// known to have no remote entry. A record read from a table is cached.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the id has neither entry, and
    /// [`CoreError::Decode`] if the stored payload cannot be read, for
    /// example under the wrong secret.
    pub fn get(&self, id: &K) -> CoreResult<R> {
        const OP: &str = "get";
        let key = id.record_key();

        if let Some(record) = self.caches.remote().get(&key) {
            return Ok(record);
        }
        // A cached draft may be shadowed by a remote row that fell out of
        // the remote cache.
        if let Some(record) = self.caches.local().get(&key) {
            if !self.is_remote(id)? {
                return Ok(record);
            }
        }

        for (table, query) in [
            (TableKind::Remotes, "SELECT data FROM remotes WHERE id=?"),
            (TableKind::Locals, "SELECT data FROM locals WHERE id=?"),
        ] {
            let row = self
                .store
                .query_row(query, &[Value::from(&*key)])
                .context(OP, &key)?;
            if let Some(row) = row {
                let data = row.blob(0).context(OP, &key)?;
                let record = self.decode(&key, data)?;
                if let Some(cache) = self.cache_for(table) {
                    cache.put(&key, record.clone());
                }
                debug!(id = %key, table = table.name(), "cached record on cold read");
                return Ok(record);
            }
        }

        Err(CoreError::not_found(key))
    }

    /// Returns the merged view: every remote record plus every local record
    /// whose id has no remote entry, ordered by id.
    ///
    /// With categories given, only records in one of them are returned.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list(&self, categories: &[i64]) -> CoreResult<Vec<R>> {
        self.merged("list", categories, false)
    }

    /// Like [`list`](Self::list), but returns records in none of `categories`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list_exclusive(&self, categories: &[i64]) -> CoreResult<Vec<R>> {
        self.merged("list_exclusive", categories, true)
    }

    /// Returns every remote record, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list_remotes(&self) -> CoreResult<Vec<R>> {
        self.records("list_remotes", TableKind::Remotes, "")
    }

    /// Returns every local record, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list_locals(&self) -> CoreResult<Vec<R>> {
        self.records("list_locals", TableKind::Locals, "")
    }

    /// Returns the pre-deletion record of every tombstone, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list_deletions(&self) -> CoreResult<Vec<R>> {
        self.records("list_deletions", TableKind::Deletions, "")
    }

    /// Returns remote records modified locally and awaiting re-push.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn list_updates(&self) -> CoreResult<Vec<R>> {
        self.records("list_updates", TableKind::Remotes, "synced=0")
    }

    /// Returns every remote entry with its metadata, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn remote_entries(&self) -> CoreResult<Vec<RemoteEntry<R>>> {
        self.remote_rows("remote_entries", "")
    }

    /// Returns the remote entries awaiting re-push, with their metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn update_entries(&self) -> CoreResult<Vec<RemoteEntry<R>>> {
        self.remote_rows("update_entries", " WHERE synced=0")
    }

    /// Returns every local entry with its metadata, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn local_entries(&self) -> CoreResult<Vec<LocalEntry<R>>> {
        const OP: &str = "local_entries";
        let rows = self
            .store
            .query(
                "SELECT id, category, data, create_time, update_time FROM locals ORDER BY id",
                &[],
            )
            .context(OP, TableKind::Locals.name())?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.text(0).context(OP, "locals")?;
            let data = row.blob(2).context(OP, id)?;
            out.push(LocalEntry {
                id: id.to_owned(),
                category: row.integer(1).context(OP, id)?,
                record: self.cached_or_decode(TableKind::Locals, id, data)?,
                create_time: row.integer(3).context(OP, id)?,
                update_time: row.integer(4).context(OP, id)?,
            });
        }
        Ok(out)
    }

    /// Returns every tombstone with its metadata, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn deletion_entries(&self) -> CoreResult<Vec<Deletion<R>>> {
        const OP: &str = "deletion_entries";
        let rows = self
            .store
            .query(
                "SELECT id, category, data, delete_time FROM deletions ORDER BY id",
                &[],
            )
            .context(OP, TableKind::Deletions.name())?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.text(0).context(OP, "deletions")?;
            let data = row.blob(2).context(OP, id)?;
            out.push(Deletion {
                id: id.to_owned(),
                category: row.integer(1).context(OP, id)?,
                record: self.decode(id, data)?,
                delete_time: row.integer(3).context(OP, id)?,
            });
        }
        Ok(out)
    }

    /// Returns true if `id` has a remote entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the lookup fails.
    pub fn is_remote(&self, id: &K) -> CoreResult<bool> {
        let key = id.record_key();
        if self.caches.remote().contains(&key) {
            return Ok(true);
        }
        self.exists(
            "is_remote",
            &key,
            "SELECT EXISTS(SELECT 1 FROM remotes WHERE id=?)",
            &[Value::from(&*key)],
        )
    }

    /// Returns true if `id` has a local entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the lookup fails.
    pub fn is_local(&self, id: &K) -> CoreResult<bool> {
        let key = id.record_key();
        if self.caches.local().contains(&key) {
            return Ok(true);
        }
        self.exists(
            "is_local",
            &key,
            "SELECT EXISTS(SELECT 1 FROM locals WHERE id=?)",
            &[Value::from(&*key)],
        )
    }

    /// Returns true if `id` has a tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the lookup fails.
    pub fn contains_deletion(&self, id: &K) -> CoreResult<bool> {
        self.tombstoned("contains_deletion", &id.record_key())
    }

    /// Returns the remote records of the given ids that exist, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn batch_get_remotes<I>(&self, ids: I) -> CoreResult<Vec<R>>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<K>,
    {
        self.batch("batch_get_remotes", TableKind::Remotes, Self::keys(ids))
    }

    /// Returns the local records of the given ids that exist, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] or [`CoreError::Store`].
    pub fn batch_get_locals<I>(&self, ids: I) -> CoreResult<Vec<R>>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<K>,
    {
        self.batch("batch_get_locals", TableKind::Locals, Self::keys(ids))
    }

    fn records(&self, op: &'static str, table: TableKind, filter: &str) -> CoreResult<Vec<R>> {
        Ok(self
            .scan(op, table, filter, &[])?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    fn merged(&self, op: &'static str, categories: &[i64], exclude: bool) -> CoreResult<Vec<R>> {
        let (filter, args) = category_filter(categories, exclude);
        let remotes = self.scan(op, TableKind::Remotes, &filter, &args)?;
        let locals = self.scan(op, TableKind::Locals, &filter, &args)?;

        let mut merged: BTreeMap<String, R> = locals.into_iter().collect();
        merged.extend(remotes);
        Ok(merged.into_values().collect())
    }

    fn remote_rows(&self, op: &'static str, filter: &str) -> CoreResult<Vec<RemoteEntry<R>>> {
        let query = format!(
            "SELECT id, category, data, update_time, synced FROM remotes{filter} ORDER BY id"
        );
        let rows = self
            .store
            .query(&query, &[])
            .context(op, TableKind::Remotes.name())?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.text(0).context(op, "remotes")?;
            let data = row.blob(2).context(op, id)?;
            out.push(RemoteEntry {
                id: id.to_owned(),
                category: row.integer(1).context(op, id)?,
                record: self.cached_or_decode(TableKind::Remotes, id, data)?,
                update_time: row.integer(3).context(op, id)?,
                synced: row.boolean(4).context(op, id)?,
            });
        }
        Ok(out)
    }

    fn batch(&self, op: &'static str, table: TableKind, keys: Vec<String>) -> CoreResult<Vec<R>> {
        let mut out = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(MAX_BATCH) {
            let filter = format!("id IN ({})", placeholders(chunk.len()));
            let args: Vec<Value> = chunk.iter().map(|k| Value::from(k.as_str())).collect();
            out.extend(
                self.scan(op, table, &filter, &args)?
                    .into_iter()
                    .map(|(_, record)| record),
            );
        }
        Ok(out)
    }
}
