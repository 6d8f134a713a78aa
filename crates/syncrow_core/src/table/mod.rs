//! The synchronized record table.

mod read;
mod write;

use crate::cache::{RecordCache, TableCaches};
use crate::clock::Clock;
use crate::config::TableOptions;
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::key::RecordKey;
use crate::schema::{create_schema, TableKind};
use crate::state::RecordState;
use crate::stats::TableStats;
use std::marker::PhantomData;
use std::sync::Arc;
use syncrow_codec::RecordCodec;
use syncrow_storage::{Store, Value};
use tracing::{debug, warn};

/// Maximum ids bound into a single `IN (...)` clause.
const MAX_BATCH: usize = 500;

/// A local-first table of records of type `R`, keyed by `K`.
///
/// Records live in one of three persisted tables:
///
/// - **remotes**: the last state confirmed by, or pushed toward, the server
/// - **locals**: drafts that have never been confirmed
/// - **deletions**: tombstones of deleted remote records
///
/// Reads prefer the remote entry when an id has both. Remote writes are
/// monotonic per id and are suppressed while a tombstone exists.
///
/// Every operation is synchronous. The table adds no locking of its own
/// beyond what the [`Store`] provides, so two callers writing the same id
/// concurrently may leave a cache entry that does not match the last store
/// write. Callers that need per-id ordering must serialize those writes.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use syncrow_core::{ManualClock, SyncTable, TableOptions};
/// use syncrow_storage::SqliteStore;
///
/// let store = Arc::new(SqliteStore::open_in_memory().unwrap());
/// let clock = Arc::new(ManualClock::new(10));
/// let table: SyncTable<String> =
///     SyncTable::open(store, TableOptions::default().clock(clock)).unwrap();
///
/// table.save_local("a", 0, "draft".to_string()).unwrap();
/// table.save_remote("a", 0, "confirmed".to_string(), 100).unwrap();
///
/// assert_eq!(table.get("a").unwrap(), "confirmed");
/// assert!(table.list_locals().unwrap().is_empty());
/// ```
pub struct SyncTable<R, K: ?Sized = str> {
    store: Arc<dyn Store>,
    codec: RecordCodec<R>,
    caches: TableCaches<R>,
    clock: Arc<dyn Clock>,
    _key: PhantomData<fn(&K)>,
}

impl<R, K> SyncTable<R, K>
where
    R: Clone,
    K: RecordKey + ?Sized,
{
    /// Opens a table on `store`, creating the three tables if needed.
    ///
    /// A store without atomic transactions is accepted, but multi-statement
    /// writes such as [`delete`](Self::delete) can then be left half applied
    /// by a failing statement. A warning is logged in that case.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the schema cannot be created.
    pub fn open(store: Arc<dyn Store>, options: TableOptions<R>) -> CoreResult<Self> {
        create_schema(store.as_ref()).context("open", "schema")?;
        if !store.supports_transactions() {
            warn!("store has no atomic transactions, writes may be partially applied");
        }
        Ok(Self {
            codec: options.codec(),
            caches: TableCaches::new(&options.cache),
            clock: options.clock,
            store,
            _key: PhantomData,
        })
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Returns the table's caches.
    pub fn caches(&self) -> &TableCaches<R> {
        &self.caches
    }

    /// Returns true if multi-statement writes are applied atomically.
    pub fn is_atomic(&self) -> bool {
        self.store.supports_transactions()
    }

    /// Returns true if records are encrypted at rest.
    pub fn has_secret(&self) -> bool {
        self.codec.has_secret()
    }

    /// Reports where `id` is in its lifecycle.
    ///
    /// A remote entry wins over everything else. A tombstoned id that has
    /// since been saved locally reports [`RecordState::Local`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if a lookup fails.
    pub fn state(&self, id: &K) -> CoreResult<RecordState> {
        const OP: &str = "state";
        let key = id.record_key();

        let synced = self
            .store
            .query_row("SELECT synced FROM remotes WHERE id=?", &[Value::from(&*key)])
            .and_then(|row| row.map(|row| row.boolean(0)).transpose())
            .context(OP, &key)?;
        match synced {
            Some(true) => return Ok(RecordState::Remote),
            Some(false) => return Ok(RecordState::RemoteDirty),
            None => {}
        }

        if self.is_local(id)? {
            Ok(RecordState::Local)
        } else if self.tombstoned(OP, &key)? {
            Ok(RecordState::Tombstoned)
        } else {
            Ok(RecordState::Absent)
        }
    }

    /// Counts the rows in each table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the count query fails.
    pub fn stats(&self) -> CoreResult<TableStats> {
        TableStats::collect(self.store.as_ref()).context("stats", "all")
    }

    fn encode(&self, id: &str, record: &R) -> CoreResult<Vec<u8>> {
        self.codec
            .encode(id, record)
            .map_err(|e| CoreError::encode(id, e))
    }

    fn decode(&self, id: &str, data: &[u8]) -> CoreResult<R> {
        self.codec.decode(id, data).map_err(|e| CoreError::decode(id, e))
    }

    fn cache_for(&self, table: TableKind) -> Option<&RecordCache<R>> {
        match table {
            TableKind::Remotes => Some(self.caches.remote()),
            TableKind::Locals => Some(self.caches.local()),
            TableKind::Deletions => None,
        }
    }

    /// Returns the cached record for `id`, or decodes `data` and caches it.
    fn cached_or_decode(&self, table: TableKind, id: &str, data: &[u8]) -> CoreResult<R> {
        let cache = self.cache_for(table);
        if let Some(record) = cache.and_then(|c| c.get(id)) {
            return Ok(record);
        }
        let record = self.decode(id, data)?;
        if let Some(cache) = cache {
            cache.put(id, record.clone());
        }
        Ok(record)
    }

    /// Runs a single-column boolean query such as `SELECT EXISTS(...)`.
    fn exists(&self, op: &'static str, target: &str, query: &str, args: &[Value]) -> CoreResult<bool> {
        self.store
            .query_row(query, args)
            .and_then(|row| row.map_or(Ok(false), |row| row.boolean(0)))
            .context(op, target)
    }

    /// Returns true if `id` has a tombstone, consulting the deletion cache first.
    fn tombstoned(&self, op: &'static str, id: &str) -> CoreResult<bool> {
        if self.caches.deletion().contains(id) {
            return Ok(true);
        }
        let found = self.exists(
            op,
            id,
            "SELECT EXISTS(SELECT 1 FROM deletions WHERE id=?)",
            &[id.into()],
        )?;
        if found {
            self.caches.deletion().put(id, ());
        }
        Ok(found)
    }

    /// Selects `(id, record)` pairs from `table`, ordered by id.
    fn scan(
        &self,
        op: &'static str,
        table: TableKind,
        filter: &str,
        args: &[Value],
    ) -> CoreResult<Vec<(String, R)>> {
        let mut query = format!("SELECT id, data FROM {}", table.name());
        if !filter.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(filter);
        }
        query.push_str(" ORDER BY id");

        let rows = self.store.query(&query, args).context(op, table.name())?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.text(0).context(op, table.name())?;
            let data = row.blob(1).context(op, table.name())?;
            let record = self.cached_or_decode(table, id, data)?;
            out.push((id.to_owned(), record));
        }
        if !out.is_empty() {
            debug!(table = table.name(), rows = out.len(), op, "scanned table");
        }
        Ok(out)
    }

    /// Renders ids to sorted, deduplicated keys.
    fn keys<I>(ids: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<K>,
    {
        use std::borrow::Borrow;
        let mut keys: Vec<String> = ids
            .into_iter()
            .map(|id| {
                let id: &K = id.borrow();
                id.record_key().into_owned()
            })
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl<R, K: ?Sized> std::fmt::Debug for SyncTable<R, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTable")
            .field("codec", &self.codec)
            .field("remote_cached", &self.caches.remote().len())
            .field("local_cached", &self.caches.local().len())
            .field("deletion_cached", &self.caches.deletion().len())
            .finish_non_exhaustive()
    }
}

/// Builds `?,?,?` for `n` arguments.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Builds a category filter. An empty slice matches everything.
fn category_filter(categories: &[i64], exclude: bool) -> (String, Vec<Value>) {
    let args: Vec<Value> = categories.iter().map(|c| Value::Integer(*c)).collect();
    let filter = match (categories.len(), exclude) {
        (0, _) => String::new(),
        (1, false) => "category=?".to_owned(),
        (1, true) => "category!=?".to_owned(),
        (n, false) => format!("category IN ({})", placeholders(n)),
        (n, true) => format!("category NOT IN ({})", placeholders(n)),
    };
    (filter, args)
}
