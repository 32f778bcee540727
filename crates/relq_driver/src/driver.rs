//! Driver capability traits.

use std::fmt;

use crate::error::DriverResult;
use crate::value::ScalarValue;

/// A named statement parameter: name (including its `@` prefix) plus value.
pub type SqlParam = (String, ScalarValue);

/// Callback invoked once per result row.
///
/// Returning `Ok(true)` continues the scan, `Ok(false)` stops it early
/// (the statement is finalized and the remaining rows are never fetched).
pub type RowVisitor<'a> = &'a mut dyn FnMut(&dyn SqlRow) -> DriverResult<bool>;

/// A borrowed view of the current result row.
///
/// Rows are only valid inside the [`SqlConnection::query`] callback; values
/// must be copied out as [`ScalarValue`] to outlive it.
pub trait SqlRow {
    /// Returns the number of columns in the row.
    fn column_count(&self) -> usize;

    /// Returns the name of the column at `index`, if in range.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Reads the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the cell cannot be
    /// represented as a scalar value.
    fn value(&self, index: usize) -> DriverResult<ScalarValue>;

    /// Returns the index of the column named `name`, if present.
    fn ordinal(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&i| self.column_name(i) == Some(name))
    }
}

/// An open connection to a database.
///
/// Connections are single-threaded: one unit of work drives one connection
/// at a time. Dropping a connection closes it; if a native transaction is
/// still open at that point the database resolves it per its own default
/// (SQLite: rollback).
pub trait SqlConnection {
    /// Executes a non-query statement and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns an error if preparation, binding, or execution fails.
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> DriverResult<u64>;

    /// Executes a query, invoking `visit` once per result row.
    ///
    /// The scan stops when the visitor returns `Ok(false)`, when rows run
    /// out, or when the visitor or the driver reports an error.
    ///
    /// # Errors
    ///
    /// Returns an error if preparation, binding, or row iteration fails,
    /// or the first error returned by the visitor.
    fn query(
        &mut self,
        sql: &str,
        params: &[SqlParam],
        visit: RowVisitor<'_>,
    ) -> DriverResult<()>;

    /// Starts a native transaction on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database rejects the begin (for example a
    /// transaction is already open on this connection).
    fn begin(&mut self) -> DriverResult<()>;

    /// Commits the native transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the commit fails.
    fn commit(&mut self) -> DriverResult<()>;

    /// Rolls back the native transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is open or the rollback fails.
    fn rollback(&mut self) -> DriverResult<()>;
}

/// A driver factory for one database product.
///
/// Drivers are registered in the [`crate::registry`] under their provider
/// name and shared process-wide, so they must be `Send + Sync`. Besides
/// opening connections a driver answers the two dialect questions the SQL
/// compiler cannot answer generically: how a paging clause is spelled and
/// how the last inserted row id is retrieved.
pub trait SqlDriver: Send + Sync {
    /// The provider name this driver registers under.
    fn name(&self) -> &'static str;

    /// Opens a connection described by `connection_string`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the database
    /// cannot be reached.
    fn connect(&self, connection_string: &str) -> DriverResult<Box<dyn SqlConnection>>;

    /// Renders the paging clause for the given named parameter placeholders.
    ///
    /// The default is the standard `OFFSET .. FETCH` form; drivers for
    /// databases that spell paging differently override this.
    fn paging_clause(&self, offset_param: &str, size_param: &str) -> String {
        format!("OFFSET {offset_param} ROWS FETCH NEXT {size_param} ROWS ONLY")
    }

    /// The query retrieving the row id generated by the most recent INSERT
    /// on the same connection.
    fn last_insert_id_sql(&self) -> &'static str;
}

impl fmt::Debug for dyn SqlDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlDriver")
            .field("name", &self.name())
            .finish()
    }
}
