//! Mutating operations.

use super::{placeholders, SyncTable, MAX_BATCH};
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::key::RecordKey;
use crate::migration::encrypt_table;
use crate::schema::TableKind;
use syncrow_storage::Value;
use tracing::{debug, info, warn};

impl<R, K> SyncTable<R, K>
where
    R: Clone,
    K: RecordKey + ?Sized,
{
    /// Saves a record confirmed by the server at `update_time`.
    ///
    /// The write is skipped, without error, when the id has a tombstone or
    /// when the stored remote entry is strictly newer than `update_time`. An
    /// accepted write marks the entry synced and purges any local draft for
    /// the id whose `update_time` is not after `update_time`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encode`] or [`CoreError::Store`].
    pub fn save_remote(&self, id: &K, category: i64, record: R, update_time: i64) -> CoreResult<()> {
        const OP: &str = "save_remote";
        let key = id.record_key();

        if self.tombstoned(OP, &key)? {
            debug!(id = %key, "skipped remote write for deleted record");
            return Ok(());
        }

        let newer = self.exists(
            OP,
            &key,
            "SELECT EXISTS(SELECT 1 FROM remotes WHERE id=? AND update_time>?)",
            &[Value::from(&*key), update_time.into()],
        )?;
        if newer {
            debug!(id = %key, update_time, "skipped outdated remote write");
            return Ok(());
        }

        let data = self.encode(&key, &record)?;
        let mut purged = 0;
        self.store
            .transaction(&mut |tx| {
                tx.exec(
                    "REPLACE INTO remotes(id, category, data, update_time, synced) VALUES(?, ?, ?, ?, 1)",
                    &[
                        Value::from(&*key),
                        category.into(),
                        Value::Blob(data.clone()),
                        update_time.into(),
                    ],
                )?;
                purged = tx.exec(
                    "DELETE FROM locals WHERE id=? AND update_time<=?",
                    &[Value::from(&*key), update_time.into()],
                )?;
                Ok(())
            })
            .context(OP, &key)?;

        self.caches.remote().put(&key, record);
        if purged > 0 {
            self.caches.local().remove(&key);
            debug!(id = %key, "purged local draft superseded by remote write");
        }
        Ok(())
    }

    /// Saves a local draft stamped with the current time.
    ///
    /// `create_time` is set on first save and kept on later saves. Remote
    /// entries and tombstones are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encode`] or [`CoreError::Store`].
    pub fn save_local(&self, id: &K, category: i64, record: R) -> CoreResult<()> {
        let key = id.record_key();
        let data = self.encode(&key, &record)?;
        let now = self.clock.now();

        self.store
            .exec(
                "INSERT INTO locals(id, category, data, create_time, update_time) VALUES(?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    category=excluded.category,
                    data=excluded.data,
                    update_time=excluded.update_time",
                &[
                    Value::from(&*key),
                    category.into(),
                    data.into(),
                    now.into(),
                    now.into(),
                ],
            )
            .context("save_local", &key)?;

        self.caches.local().put(&key, record);
        Ok(())
    }

    /// Updates whichever entry `id` has, preferring the remote one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the id has neither a remote nor a
    /// local entry.
    pub fn update(&self, id: &K, record: R) -> CoreResult<()> {
        let key = id.record_key();
        let data = self.encode(&key, &record)?;

        if self.is_remote(id)? {
            self.write_remote_update(&key, data, record)
        } else if self.is_local(id)? {
            self.write_local_update(&key, data, record)
        } else {
            Err(CoreError::not_found(key))
        }
    }

    /// Replaces the data of a remote entry and marks it unsynced.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if there is no remote entry for `id`.
    pub fn update_remote(&self, id: &K, record: R) -> CoreResult<()> {
        let key = id.record_key();
        let data = self.encode(&key, &record)?;
        self.write_remote_update(&key, data, record)
    }

    /// Replaces the data of a local entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if there is no local entry for `id`.
    pub fn update_local(&self, id: &K, record: R) -> CoreResult<()> {
        let key = id.record_key();
        let data = self.encode(&key, &record)?;
        self.write_local_update(&key, data, record)
    }

    /// Deletes `id` from the table.
    ///
    /// A local entry is removed. A remote entry is moved into a tombstone
    /// stamped with the current time, which suppresses later remote writes
    /// for the id until [`remove_deletions`](Self::remove_deletions). All
    /// steps run in one store transaction. Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`]; nothing is changed in that case when
    /// [`is_atomic`](Self::is_atomic) is true.
    pub fn delete(&self, id: &K) -> CoreResult<()> {
        let key = id.record_key();
        let now = self.clock.now();

        let mut tombstoned = false;
        self.store
            .transaction(&mut |tx| {
                tombstoned = false;
                tx.exec("DELETE FROM locals WHERE id=?", &[Value::from(&*key)])?;

                let Some(row) = tx.query_row(
                    "SELECT category, data FROM remotes WHERE id=?",
                    &[Value::from(&*key)],
                )?
                else {
                    return Ok(());
                };
                let category = row.integer(0)?;
                let data = row.get(1)?.clone();

                tx.exec(
                    "REPLACE INTO deletions(id, category, data, delete_time) VALUES(?, ?, ?, ?)",
                    &[Value::from(&*key), category.into(), data, now.into()],
                )?;
                tx.exec("DELETE FROM remotes WHERE id=?", &[Value::from(&*key)])?;
                tombstoned = true;
                Ok(())
            })
            .context("delete", &key)?;

        self.caches.local().remove(&key);
        if tombstoned {
            self.caches.deletion().put(&key, ());
            self.caches.remote().remove(&key);
            debug!(id = %key, "tombstoned remote record");
        }
        Ok(())
    }

    /// Clears tombstones once the server has observed the deletions.
    ///
    /// Returns the number of tombstones removed. Remote writes for these ids
    /// are accepted again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`].
    pub fn remove_deletions<I>(&self, ids: I) -> CoreResult<usize>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<K>,
    {
        let keys = Self::keys(ids);
        let mut removed = 0;
        for chunk in keys.chunks(MAX_BATCH) {
            let query = format!("DELETE FROM deletions WHERE id IN ({})", placeholders(chunk.len()));
            let args: Vec<Value> = chunk.iter().map(|k| Value::from(k.as_str())).collect();
            removed += self
                .store
                .exec(&query, &args)
                .context("remove_deletions", TableKind::Deletions.name())?;
            for key in chunk {
                self.caches.deletion().remove(key);
            }
        }
        Ok(removed)
    }

    /// Deletes every remote entry, typically before a full resync.
    ///
    /// Returns the number of rows removed. Tombstones and locals are kept.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`].
    pub fn remove_all_remotes(&self) -> CoreResult<usize> {
        let removed = self
            .store
            .exec("DELETE FROM remotes", &[])
            .context("remove_all_remotes", TableKind::Remotes.name())?;
        self.caches.remote().clear();
        info!(removed, "removed all remote records");
        Ok(removed)
    }

    /// Deletes every local entry whose id also has a remote entry.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`].
    pub fn clean_locals(&self) -> CoreResult<usize> {
        let mut shadowed: Vec<String> = Vec::new();
        self.store
            .transaction(&mut |tx| {
                shadowed = tx
                    .query("SELECT id FROM locals WHERE id IN (SELECT id FROM remotes)", &[])?
                    .iter()
                    .map(|row| row.text(0).map(str::to_owned))
                    .collect::<Result<_, _>>()?;
                tx.exec("DELETE FROM locals WHERE id IN (SELECT id FROM remotes)", &[])?;
                Ok(())
            })
            .context("clean_locals", TableKind::Locals.name())?;

        for id in &shadowed {
            self.caches.local().remove(id);
        }
        info!(removed = shadowed.len(), "removed locals already saved remotely");
        Ok(shadowed.len())
    }

    /// Encrypts rows written before a secret was configured.
    ///
    /// Walks all three tables and rewrites every plaintext payload. Already
    /// encrypted rows are skipped, so repeated runs do nothing. Without a
    /// secret this logs a warning and returns zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encode`] or [`CoreError::Store`]. Tables finished
    /// before the failure stay encrypted.
    pub fn encrypt_plain_data(&self) -> CoreResult<usize> {
        if !self.codec.has_secret() {
            warn!("encrypt_plain_data called without a secret, nothing to do");
            return Ok(0);
        }

        let mut total = 0;
        for table in TableKind::ALL {
            let encrypted = encrypt_table(self.store.as_ref(), &self.codec, table)?;
            if encrypted > 0 {
                info!(table = table.name(), rows = encrypted, "encrypted plaintext rows");
            }
            total += encrypted;
        }
        Ok(total)
    }

    fn write_remote_update(&self, key: &str, data: Vec<u8>, record: R) -> CoreResult<()> {
        let changed = self
            .store
            .exec(
                "UPDATE remotes SET data=?, update_time=?, synced=0 WHERE id=?",
                &[data.into(), self.clock.now().into(), key.into()],
            )
            .context("update_remote", key)?;
        if changed == 0 {
            return Err(CoreError::not_found(key));
        }
        self.caches.remote().put(key, record);
        Ok(())
    }

    fn write_local_update(&self, key: &str, data: Vec<u8>, record: R) -> CoreResult<()> {
        let changed = self
            .store
            .exec(
                "UPDATE locals SET data=?, update_time=? WHERE id=?",
                &[data.into(), self.clock.now().into(), key.into()],
            )
            .context("update_local", key)?;
        if changed == 0 {
            return Err(CoreError::not_found(key));
        }
        self.caches.local().put(key, record);
        Ok(())
    }
}
