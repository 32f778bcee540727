//! Statement runner over a leased connection.

use std::cell::RefCell;
use std::rc::Rc;

use relq_driver::{ScalarKind, ScalarValue, SqlConnection, SqlParam};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::exec::cancel::CancelToken;
use crate::exec::convert::to_kind;
use crate::schema::{Entity, EntityDescriptor, FieldSpec};
use crate::sql::{AliasMap, CompiledQuery};

/// A leased connection: either owned by this call, closed when the lease
/// drops, or borrowed from the session transaction and left open.
pub(crate) enum ConnectionLease {
    Owned(RefCell<Box<dyn SqlConnection>>),
    Shared(Rc<RefCell<Box<dyn SqlConnection>>>),
}

impl ConnectionLease {
    pub fn owned(conn: Box<dyn SqlConnection>) -> Self {
        Self::Owned(RefCell::new(conn))
    }

    pub fn shared(conn: Rc<RefCell<Box<dyn SqlConnection>>>) -> Self {
        Self::Shared(conn)
    }

    fn with<R>(&self, f: impl FnOnce(&mut dyn SqlConnection) -> R) -> R {
        match self {
            Self::Owned(cell) => {
                let mut guard = cell.borrow_mut();
                f(guard.as_mut())
            }
            Self::Shared(cell) => {
                let mut guard = cell.borrow_mut();
                f(guard.as_mut())
            }
        }
    }
}

/// Buffered result rows with their projected column names.
pub(crate) struct RawRows {
    pub names: Vec<String>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl RawRows {
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Runs compiled statements on one lease, checking the cancel token before
/// every execution and at every fetched row.
pub(crate) struct StatementRunner<'a> {
    lease: &'a ConnectionLease,
    cancel: &'a CancelToken,
}

impl<'a> StatementRunner<'a> {
    pub fn new(lease: &'a ConnectionLease, cancel: &'a CancelToken) -> Self {
        Self { lease, cancel }
    }

    /// Executes a non-query statement and returns the affected row count.
    pub fn execute(&self, sql: &str, params: &[SqlParam]) -> CoreResult<u64> {
        self.cancel.ensure()?;
        debug!("executing: {} {:?}", sql, params);
        let affected = self.lease.with(|conn| conn.execute(sql, params))?;
        Ok(affected)
    }

    /// Executes a query and returns the first column of the first row.
    pub fn query_scalar(&self, sql: &str, params: &[SqlParam]) -> CoreResult<Option<ScalarValue>> {
        self.cancel.ensure()?;
        debug!("executing: {} {:?}", sql, params);
        let mut first: Option<ScalarValue> = None;
        self.lease.with(|conn| {
            conn.query(sql, params, &mut |row| {
                first = Some(row.value(0)?);
                Ok(false)
            })
        })?;
        Ok(first)
    }

    /// Executes a query and buffers every row.
    ///
    /// Cancellation stops the scan between rows and fails the call; the
    /// lease still closes an owned connection on drop.
    pub fn fetch_raw(&self, sql: &str, params: &[SqlParam]) -> CoreResult<RawRows> {
        self.cancel.ensure()?;
        debug!("executing: {} {:?}", sql, params);
        let mut names: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<ScalarValue>> = Vec::new();
        let mut cancelled = false;
        self.lease.with(|conn| {
            conn.query(sql, params, &mut |row| {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    return Ok(false);
                }
                if names.is_empty() {
                    names = (0..row.column_count())
                        .map(|i| row.column_name(i).unwrap_or_default().to_string())
                        .collect();
                }
                let mut values = Vec::with_capacity(names.len());
                for i in 0..names.len() {
                    values.push(row.value(i)?);
                }
                rows.push(values);
                Ok(true)
            })
        })?;
        if cancelled {
            return Err(CoreError::Cancelled);
        }
        Ok(RawRows { names, rows })
    }
}

/// Materializes root entities from projected rows.
///
/// Each row becomes a default instance with every projected root column
/// converted to its declared kind and written through `Entity::set`. When
/// the compiled query piggybacked a total count, the first row's value for
/// that column is returned alongside.
pub(crate) fn materialize<T: Entity>(
    descriptor: &EntityDescriptor,
    compiled: &CompiledQuery,
    raw: &RawRows,
) -> CoreResult<(Vec<T>, Option<i64>)> {
    let ordinals: Vec<(usize, &FieldSpec)> = descriptor
        .columns()
        .iter()
        .filter_map(|column| {
            raw.ordinal(&format!("{}_{}", AliasMap::ROOT, column.name))
                .map(|i| (i, column))
        })
        .collect();

    let mut items = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let mut entity = T::default();
        for (ordinal, column) in &ordinals {
            let value = to_kind(row[*ordinal].clone(), column.kind)?;
            if !entity.set(column.name, value) {
                return Err(CoreError::schema(
                    descriptor.type_name(),
                    format!("declared field {} is not settable", column.name),
                ));
            }
        }
        items.push(entity);
    }

    let total = match compiled.total_column.and_then(|name| raw.ordinal(name)) {
        Some(ordinal) => match raw.rows.first() {
            Some(row) => to_kind(row[ordinal].clone(), ScalarKind::Integer)?.as_integer(),
            None => None,
        },
        None => None,
    };

    Ok((items, total))
}
