//! SQLite store built on rusqlite.

use crate::error::StorageResult;
use crate::store::{Executor, Store};
use crate::value::{Row, Value};
use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Value::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>, columns: usize) -> rusqlite::Result<Row> {
    let mut values = Vec::with_capacity(columns);
    for index in 0..columns {
        values.push(match row.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        });
    }
    Ok(Row::new(values))
}

/// Executes statements on a borrowed connection or transaction.
struct ConnExecutor<'a> {
    conn: &'a Connection,
}

impl<'a> ConnExecutor<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Executor for ConnExecutor<'_> {
    fn exec(&self, query: &str, args: &[Value]) -> StorageResult<usize> {
        let mut stmt = self.conn.prepare_cached(query)?;
        let changed = stmt.execute(params_from_iter(args.iter()))?;
        Ok(changed)
    }

    fn query(&self, query: &str, args: &[Value]) -> StorageResult<Vec<Row>> {
        let mut stmt = self.conn.prepare_cached(query)?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| read_row(row, columns))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_row(&self, query: &str, args: &[Value]) -> StorageResult<Option<Row>> {
        let mut stmt = self.conn.prepare_cached(query)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(args.iter()))?;
        let first = match rows.next()? {
            Some(row) => Some(read_row(row, columns)?),
            None => None,
        };
        Ok(first)
    }
}

/// A [`Store`] backed by a single SQLite connection.
///
/// The connection is guarded by a mutex, so one store can be shared by many
/// threads. Statements from different callers are serialized; a
/// [`transaction`](Store::transaction) holds the connection for its whole
/// duration.
///
/// # Example
///
/// ```rust
/// use syncrow_storage::{Executor, SqliteStore, Store};
///
/// let store = SqliteStore::open_in_memory().unwrap();
/// store.exec("CREATE TABLE t(id INTEGER)", &[]).unwrap();
/// store
///     .transaction(&mut |tx| {
///         tx.exec("INSERT INTO t(id) VALUES(?)", &[1i64.into()])?;
///         tx.exec("INSERT INTO t(id) VALUES(?)", &[2i64.into()])?;
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(store.query("SELECT id FROM t", &[]).unwrap().len(), 2);
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    ///
    /// Missing parent directories are created. The database is switched to
    /// WAL journaling so readers in other processes do not block writers.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or SQLite cannot
    /// open the file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
        })
    }

    /// Returns the database file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Executor for SqliteStore {
    fn exec(&self, query: &str, args: &[Value]) -> StorageResult<usize> {
        let conn = self.conn.lock();
        ConnExecutor::new(&conn).exec(query, args)
    }

    fn query(&self, query: &str, args: &[Value]) -> StorageResult<Vec<Row>> {
        let conn = self.conn.lock();
        ConnExecutor::new(&conn).query(query, args)
    }

    fn query_row(&self, query: &str, args: &[Value]) -> StorageResult<Option<Row>> {
        let conn = self.conn.lock();
        ConnExecutor::new(&conn).query_row(query, args)
    }
}

impl Store for SqliteStore {
    /// Runs `f` in a deferred SQLite transaction.
    ///
    /// `f` must issue its statements through the executor it is given.
    /// Calling back into this store from inside `f` deadlocks.
    fn transaction(
        &self,
        f: &mut dyn FnMut(&dyn Executor) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        f(&ConnExecutor::new(&tx))?;
        tx.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::sync::Arc;

    fn kv_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec("CREATE TABLE kv(k VARCHAR PRIMARY KEY, n INTEGER, v BLOB)", &[])
            .unwrap();
        store
    }

    #[test]
    fn exec_reports_changed_rows() {
        let store = kv_store();
        let n = store
            .exec(
                "INSERT INTO kv(k, n, v) VALUES(?, ?, ?)",
                &["a".into(), 1i64.into(), vec![1u8].into()],
            )
            .unwrap();
        assert_eq!(n, 1);

        let n = store
            .exec("UPDATE kv SET n=? WHERE k=?", &[2i64.into(), "missing".into()])
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn query_row_returns_first_or_none() {
        let store = kv_store();
        store
            .exec(
                "INSERT INTO kv(k, n, v) VALUES(?, ?, ?)",
                &["a".into(), 5i64.into(), Value::Null],
            )
            .unwrap();

        let row = store
            .query_row("SELECT k, n, v FROM kv WHERE k=?", &["a".into()])
            .unwrap()
            .unwrap();
        assert_eq!(row.text(0).unwrap(), "a");
        assert_eq!(row.integer(1).unwrap(), 5);
        assert_eq!(row.get(2).unwrap(), &Value::Null);

        let none = store
            .query_row("SELECT k FROM kv WHERE k=?", &["b".into()])
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn placeholders_are_not_interpolated() {
        let store = kv_store();
        let hostile = "x'); DROP TABLE kv; --";
        store
            .exec("INSERT INTO kv(k, n) VALUES(?, ?)", &[hostile.into(), 0i64.into()])
            .unwrap();

        let rows = store.query("SELECT k FROM kv", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(0).unwrap(), hostile);
    }

    #[test]
    fn transaction_commits_on_ok() {
        let store = kv_store();
        store
            .transaction(&mut |tx| {
                tx.exec("INSERT INTO kv(k, n) VALUES(?, ?)", &["a".into(), 1i64.into()])?;
                tx.exec("INSERT INTO kv(k, n) VALUES(?, ?)", &["b".into(), 2i64.into()])?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.query("SELECT k FROM kv", &[]).unwrap().len(), 2);
    }

    #[test]
    fn transaction_rolls_back_on_err() {
        let store = kv_store();
        let result = store.transaction(&mut |tx| {
            tx.exec("INSERT INTO kv(k, n) VALUES(?, ?)", &["a".into(), 1i64.into()])?;
            // duplicate primary key
            tx.exec("INSERT INTO kv(k, n) VALUES(?, ?)", &["a".into(), 2i64.into()])?;
            Ok(())
        });

        assert!(matches!(result, Err(StorageError::Sqlite(_))));
        assert!(store.query("SELECT k FROM kv", &[]).unwrap().is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            store.exec("CREATE TABLE t(id INTEGER)", &[]).unwrap();
            store.exec("INSERT INTO t(id) VALUES(?)", &[42i64.into()]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let row = store.query_row("SELECT id FROM t", &[]).unwrap().unwrap();
        assert_eq!(row.integer(0).unwrap(), 42);
    }

    #[test]
    fn shared_between_threads() {
        let store = Arc::new(kv_store());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store
                            .exec(
                                "INSERT INTO kv(k, n) VALUES(?, ?)",
                                &[format!("{t}-{i}").into(), i64::from(i).into()],
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.query("SELECT k FROM kv", &[]).unwrap().len(), 100);
    }
}
