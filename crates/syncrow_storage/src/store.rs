//! Store trait definitions.

use crate::error::StorageResult;
use crate::value::{Row, Value};

/// Executes parameterized statements.
///
/// Placeholders are written as `?` and bound positionally from `args`.
/// Implementations must never splice argument values into the query text.
///
/// # Implementors
///
/// - [`super::SqliteStore`] - the shared connection
/// - the transaction-scoped executor handed out by [`Store::transaction`]
pub trait Executor {
    /// Executes a statement that returns no rows.
    ///
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be prepared or executed.
    fn exec(&self, query: &str, args: &[Value]) -> StorageResult<usize>;

    /// Executes a query and collects every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be prepared or executed.
    fn query(&self, query: &str, args: &[Value]) -> StorageResult<Vec<Row>>;

    /// Executes a query and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be prepared or executed.
    fn query_row(&self, query: &str, args: &[Value]) -> StorageResult<Option<Row>>;
}

/// A relational store shared by every caller of a table.
///
/// # Invariants
///
/// - Statements issued by concurrent callers do not corrupt each other
/// - A successful `exec` is durable before it returns
/// - `transaction` either applies every statement run by `f` or none of them,
///   when [`supports_transactions`](Self::supports_transactions) is true
pub trait Store: Executor + Send + Sync {
    /// Runs `f` inside a single transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`. The error from `f` is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error if the transaction cannot be
    /// started or committed.
    fn transaction(
        &self,
        f: &mut dyn FnMut(&dyn Executor) -> StorageResult<()>,
    ) -> StorageResult<()>;

    /// Returns true if [`transaction`](Self::transaction) is atomic.
    fn supports_transactions(&self) -> bool {
        true
    }
}
