//! Bundled SQLite driver.
//!
//! Built on `rusqlite` with the bundled SQLite library, so it works without
//! a system SQLite installation. Connection strings are either `:memory:`
//! or a filesystem path.

use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::driver::{RowVisitor, SqlConnection, SqlDriver, SqlParam, SqlRow};
use crate::error::{DriverError, DriverResult};
use crate::registry::SQLITE_PROVIDER;
use crate::value::ScalarValue;

/// Driver factory for SQLite databases.
#[derive(Debug, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Creates the driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SqlDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        SQLITE_PROVIDER
    }

    fn connect(&self, connection_string: &str) -> DriverResult<Box<dyn SqlConnection>> {
        let conn = if connection_string == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(connection_string)
        }
        .map_err(|err| DriverError::connect(err.to_string()))?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Box::new(SqliteConnection { conn }))
    }

    fn paging_clause(&self, offset_param: &str, size_param: &str) -> String {
        format!("LIMIT {size_param} OFFSET {offset_param}")
    }

    fn last_insert_id_sql(&self) -> &'static str {
        "SELECT last_insert_rowid()"
    }
}

struct SqliteConnection {
    conn: Connection,
}

impl SqlConnection for SqliteConnection {
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> DriverResult<u64> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;
        let affected = stmt.raw_execute()?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str, params: &[SqlParam], visit: RowVisitor<'_>) -> DriverResult<()> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;
        // Column names must be captured before raw_query borrows the
        // statement for the cursor.
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let view = SqliteRow { names: &names, row };
            if !visit(&view)? {
                break;
            }
        }
        Ok(())
    }

    fn begin(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[SqlParam]) -> DriverResult<()> {
    for (name, value) in params {
        let index = stmt
            .parameter_index(name)?
            .ok_or_else(|| DriverError::parameter_mismatch(name))?;
        stmt.raw_bind_parameter(index, to_sqlite(value))?;
    }
    Ok(())
}

fn to_sqlite(value: &ScalarValue) -> rusqlite::types::Value {
    use rusqlite::types::Value;
    match value {
        ScalarValue::Null => Value::Null,
        // SQLite has no boolean type; store as 0/1.
        ScalarValue::Bool(b) => Value::Integer(i64::from(*b)),
        ScalarValue::Integer(i) => Value::Integer(*i),
        ScalarValue::Real(r) => Value::Real(*r),
        ScalarValue::Text(t) => Value::Text(t.clone()),
        ScalarValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> DriverResult<ScalarValue> {
    Ok(match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(i) => ScalarValue::Integer(i),
        ValueRef::Real(r) => ScalarValue::Real(r),
        ValueRef::Text(t) => {
            let text = std::str::from_utf8(t).map_err(rusqlite::Error::Utf8Error)?;
            ScalarValue::Text(text.to_string())
        }
        ValueRef::Blob(b) => ScalarValue::Blob(b.to_vec()),
    })
}

struct SqliteRow<'a, 'stmt> {
    names: &'a [String],
    row: &'a rusqlite::Row<'stmt>,
}

impl SqlRow for SqliteRow<'_, '_> {
    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    fn value(&self, index: usize) -> DriverResult<ScalarValue> {
        if index >= self.names.len() {
            return Err(DriverError::ColumnOutOfRange {
                index,
                count: self.names.len(),
            });
        }
        from_sqlite(self.row.get_ref(index)?)
    }
}
