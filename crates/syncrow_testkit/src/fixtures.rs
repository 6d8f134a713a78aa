//! Test fixtures and table helpers.
//!
//! Provides a record type and convenience functions for setting up
//! tables with a controllable clock.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use syncrow_codec::Secret;
use syncrow_core::{CacheConfig, ManualClock, SyncTable, TableOptions};
use syncrow_storage::{SqliteStore, Store};
use tempfile::TempDir;

/// Clock reading every fixture starts at.
pub const START_TIME: i64 = 1_000;

/// A small record type used throughout the tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Title line.
    pub title: String,
    /// Free text.
    pub body: String,
    /// Whether the note is pinned.
    pub pinned: bool,
}

impl Note {
    /// Creates an unpinned note with an empty body.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Marks the note as pinned.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// A test table with a manual clock and automatic cleanup.
pub struct TestTable {
    /// The table instance.
    pub table: SyncTable<Note>,
    clock: Arc<ManualClock>,
    secret: Option<String>,
    cache: CacheConfig,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestTable {
    /// Creates a table on a fresh in-memory database.
    pub fn memory() -> Self {
        Self::build(None, None, CacheConfig::default())
    }

    /// Creates an in-memory table that encrypts records with `secret`.
    pub fn encrypted(secret: &str) -> Self {
        Self::build(None, Some(secret.to_string()), CacheConfig::default())
    }

    /// Creates an in-memory table with the given cache capacities.
    pub fn with_cache(cache: CacheConfig) -> Self {
        Self::build(None, None, cache)
    }

    /// Creates a table backed by a file in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_secret(None)
    }

    /// Creates a file-backed table, optionally encrypted.
    pub fn file_with_secret(secret: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.db");
        Self::build(
            Some((path, temp_dir)),
            secret.map(str::to_string),
            CacheConfig::default(),
        )
    }

    fn build(file: Option<(PathBuf, TempDir)>, secret: Option<String>, cache: CacheConfig) -> Self {
        let clock = Arc::new(ManualClock::new(START_TIME));
        let (path, temp_dir) = match file {
            Some((path, dir)) => (Some(path), Some(dir)),
            None => (None, None),
        };
        let table = open_table(path.as_deref(), &clock, secret.as_deref(), cache);
        Self {
            table,
            clock,
            secret,
            cache,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Closes the database and opens it again with the same secret.
    ///
    /// All caches start empty afterwards. Panics for in-memory tables.
    pub fn reopen(self) -> Self {
        let secret = self.secret.clone();
        self.reopen_with_secret(secret.as_deref())
    }

    /// Closes the database and opens it again with another secret.
    pub fn reopen_with_secret(self, secret: Option<&str>) -> Self {
        let Self {
            table,
            clock,
            cache,
            path,
            _temp_dir,
            ..
        } = self;
        drop(table);

        let path = path.expect("In-memory tables cannot be reopened");
        let secret = secret.map(str::to_string);
        let table = open_table(Some(&path), &clock, secret.as_deref(), cache);
        Self {
            table,
            clock,
            secret,
            cache,
            path: Some(path),
            _temp_dir,
        }
    }

    /// Returns the clock the table stamps writes with.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Moves the clock forward, returning the new reading.
    pub fn advance(&self, secs: i64) -> i64 {
        self.clock.advance(secs)
    }

    /// Returns the current clock reading.
    pub fn now(&self) -> i64 {
        syncrow_core::Clock::now(self.clock.as_ref())
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn open_table(
    path: Option<&Path>,
    clock: &Arc<ManualClock>,
    secret: Option<&str>,
    cache: CacheConfig,
) -> SyncTable<Note> {
    let store: Arc<dyn Store> = match path {
        Some(path) => Arc::new(SqliteStore::open(path).expect("Failed to open database file")),
        None => Arc::new(SqliteStore::open_in_memory().expect("Failed to open in-memory database")),
    };

    let mut options = TableOptions::default()
        .clock(Arc::clone(clock) as Arc<dyn syncrow_core::Clock>)
        .cache_config(cache);
    if let Some(secret) = secret {
        options = options.secret(Secret::new(secret));
    }

    SyncTable::open(store, options).expect("Failed to open table")
}

impl std::ops::Deref for TestTable {
    type Target = SyncTable<Note>;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

/// Runs a test with a temporary in-memory table.
///
/// # Example
///
/// ```rust
/// use syncrow_testkit::{with_temp_table, Note};
///
/// with_temp_table(|table| {
///     table.save_remote("n1", 0, Note::new("hello"), 5).unwrap();
///     assert!(table.is_remote("n1").unwrap());
/// });
/// ```
pub fn with_temp_table<F, R>(f: F) -> R
where
    F: FnOnce(&TestTable) -> R,
{
    let table = TestTable::memory();
    f(&table)
}

/// Runs a test with a temporary file-backed table.
pub fn with_file_table<F, R>(f: F) -> R
where
    F: FnOnce(&TestTable, &Path) -> R,
{
    let table = TestTable::file();
    let path = table
        .path()
        .expect("File table should have a path")
        .to_path_buf();
    f(&table, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Id of the `n`th remote record created by [`populated`].
    pub fn remote_id(n: usize) -> String {
        format!("r{:05}", n)
    }

    /// Id of the `n`th local record created by [`populated`].
    pub fn local_id(n: usize) -> String {
        format!("l{:05}", n)
    }

    /// Creates a table with `remotes` confirmed records and `locals` drafts.
    ///
    /// Remote records are spread over categories 0 to 2 and stamped with
    /// [`START_TIME`].
    pub fn populated(remotes: usize, locals: usize) -> TestTable {
        let table = TestTable::memory();
        fill(&table, remotes, locals);
        table
    }

    /// Adds records to an existing table the same way [`populated`] does.
    pub fn fill(table: &TestTable, remotes: usize, locals: usize) {
        for n in 0..remotes {
            let category = i64::try_from(n % 3).unwrap_or_default();
            table
                .save_remote(
                    remote_id(n).as_str(),
                    category,
                    Note::new(format!("remote {}", n)),
                    START_TIME,
                )
                .expect("Failed to save remote");
        }
        for n in 0..locals {
            table
                .save_local(local_id(n).as_str(), 0, Note::new(format!("local {}", n)))
                .expect("Failed to save local");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_table_starts_empty() {
        let table = TestTable::memory();
        assert!(table.path().is_none());
        assert_eq!(table.now(), START_TIME);
        assert_eq!(table.stats().unwrap().live(), 0);
    }

    #[test]
    fn reopen_keeps_rows_and_clears_caches() {
        let table = TestTable::file();
        table.save_local("a", 0, Note::new("a")).unwrap();
        assert_eq!(table.caches().local().len(), 1);

        let table = table.reopen();
        assert!(table.caches().local().is_empty());
        assert_eq!(table.get("a").unwrap(), Note::new("a"));
    }

    #[test]
    fn populated_counts() {
        let table = scenarios::populated(5, 2);
        let stats = table.stats().unwrap();
        assert_eq!(stats.remotes, 5);
        assert_eq!(stats.locals, 2);
        assert_eq!(table.list(&[1]).unwrap().len(), 2);
    }
}
