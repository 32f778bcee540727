//! The session: query entry points, change queue, flush, transactions.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;

use relq_driver::{registry, ScalarValue, SqlConnection, SqlDriver, SqlParam};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{CoreError, CoreResult};
use crate::exec::{materialize, to_kind, CancelToken, ConnectionLease, StatementRunner};
use crate::query::{Filter, QuerySpec};
use crate::schema::{descriptor, Entity, EntityDescriptor};
use crate::sql::{select, write};
use crate::track::{ChangeEntry, ChangeOp, PendingChange, Tracked, TrackedEntry};

/// One page of query results with the unpaged total.
#[derive(Debug)]
pub struct PagedResult<T> {
    /// The rows of the requested page, in query order.
    pub items: Vec<T>,

    /// Number of rows the filter matches across all pages.
    pub total: i64,

    /// Zero-based index of this page.
    pub page_index: i64,

    /// Requested page size.
    pub page_size: i64,
}

/// A unit of work against one database.
///
/// A session compiles declarative queries to SQL, queues entity changes,
/// and flushes them in registration order. Connection ownership is strict:
/// outside a transaction every call opens its own connection and closes it
/// before returning, so no lock outlives the call. [`begin_transaction`]
/// switches the session to one long-lived connection that every call reuses
/// until [`commit`] or [`rollback`] releases it.
///
/// [`commit`]: Session::commit
/// [`rollback`]: Session::rollback
/// [`begin_transaction`]: Session::begin_transaction
pub struct Session {
    driver: Arc<dyn SqlDriver>,
    config: SessionConfig,
    pending: Vec<PendingChange>,
    txn: Option<Rc<RefCell<Box<dyn SqlConnection>>>>,
    cancel: CancelToken,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("pending", &self.pending.len())
            .field("in_transaction", &self.txn.is_some())
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Opens a session for the configured provider.
    ///
    /// No connection is established yet; the first query or flush opens
    /// one. Fails with [`CoreError::Configuration`] when the config is
    /// incomplete or names an unregistered provider.
    pub fn open(config: SessionConfig) -> CoreResult<Self> {
        config.validate()?;
        let driver = registry::resolve(&config.provider)
            .map_err(|e| CoreError::configuration(e.to_string()))?;
        debug!("session opened for provider {}", driver.name());
        Ok(Self {
            driver,
            config,
            pending: Vec::new(),
            txn: None,
            cancel: CancelToken::new(),
        })
    }

    /// The configuration this session was opened with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A clonable token that cancels this session's statements.
    ///
    /// Cancellation is sticky: once cancelled, every subsequent operation
    /// on the session fails with [`CoreError::Cancelled`].
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether a session transaction is active.
    pub fn in_transaction(&self) -> bool {
        self.txn.is_some()
    }

    /// Number of queued changes not yet flushed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // === Queries ===

    /// Runs a query spec and materializes every matching row.
    pub fn query<T: Entity>(&self, spec: &QuerySpec) -> CoreResult<Vec<T>> {
        let d = descriptor::<T>()?;
        let compiled = select::compile(&d, spec, self.driver.as_ref())?;
        let lease = self.lease()?;
        let runner = StatementRunner::new(&lease, &self.cancel);
        let raw = runner.fetch_raw(&compiled.sql, &compiled.params)?;
        let (items, _) = materialize::<T>(&d, &compiled, &raw)?;
        Ok(items)
    }

    /// Runs a paged query spec, fetching the page and the unpaged total in
    /// one statement.
    ///
    /// A page window past the last row comes back empty with a total of
    /// zero.
    pub fn query_paged<T: Entity>(&self, spec: &QuerySpec) -> CoreResult<PagedResult<T>> {
        let d = descriptor::<T>()?;
        let compiled = select::compile_paged(&d, spec, self.driver.as_ref())?;
        let lease = self.lease()?;
        let runner = StatementRunner::new(&lease, &self.cancel);
        let raw = runner.fetch_raw(&compiled.sql, &compiled.params)?;
        let (items, total) = materialize::<T>(&d, &compiled, &raw)?;
        Ok(PagedResult {
            total: total.unwrap_or(items.len() as i64),
            page_index: spec.page_index,
            page_size: spec.page_size,
            items,
        })
    }

    /// Loads one entity by primary key.
    ///
    /// Only single-column keys can be looked up this way; composite-key
    /// types fail with a translation error and should be queried with a
    /// filter instead.
    pub fn find<T: Entity>(&self, key: impl Into<ScalarValue>) -> CoreResult<Option<T>> {
        let d = descriptor::<T>()?;
        let key_columns = d.key_columns();
        let [key_column] = key_columns.as_slice() else {
            return Err(CoreError::translation(format!(
                "find on {} requires a single-column key",
                d.type_name(),
            )));
        };
        let spec = QuerySpec::new().filter(Filter::eq(key_column.name, key.into()));
        Ok(self.query::<T>(&spec)?.into_iter().next())
    }

    /// Counts the rows matching a filter without materializing them.
    pub fn count<T: Entity>(&self, filter: Option<&Filter>) -> CoreResult<i64> {
        let d = descriptor::<T>()?;
        let compiled = select::compile_count(&d, filter)?;
        let lease = self.lease()?;
        let runner = StatementRunner::new(&lease, &self.cancel);
        let value = runner.query_scalar(&compiled.sql, &compiled.params)?;
        Ok(value.and_then(|v| v.as_integer()).unwrap_or(0))
    }

    /// Executes raw SQL with named parameters and returns the affected row
    /// count.
    ///
    /// The statement runs on the session transaction when one is active,
    /// otherwise on a connection opened and closed within this call.
    pub fn execute_raw(&self, sql: &str, params: &[SqlParam]) -> CoreResult<u64> {
        let lease = self.lease()?;
        let runner = StatementRunner::new(&lease, &self.cancel);
        runner.execute(sql, params)
    }

    // === Change tracking ===

    /// Queues an entity for insertion and returns its tracked handle.
    ///
    /// Nothing is written until [`save_changes`]; for identity entities the
    /// generated key lands in the handle after the flush.
    ///
    /// [`save_changes`]: Session::save_changes
    pub fn add<T: Entity>(&mut self, entity: T) -> Tracked<T> {
        self.queue(ChangeOp::Add, entity)
    }

    /// Queues an entity for update by primary key.
    pub fn update<T: Entity>(&mut self, entity: T) -> Tracked<T> {
        self.queue(ChangeOp::Modify, entity)
    }

    /// Queues an entity for deletion by primary key.
    pub fn remove<T: Entity>(&mut self, entity: T) -> Tracked<T> {
        self.queue(ChangeOp::Remove, entity)
    }

    fn queue<T: Entity>(&mut self, op: ChangeOp, entity: T) -> Tracked<T> {
        let tracked = Tracked::new(entity);
        self.pending
            .push(PendingChange::new(op, TrackedEntry::boxed(&tracked)));
        tracked
    }

    /// Flushes queued changes in registration order and returns the total
    /// affected row count.
    ///
    /// Each change is checked against the database first: adding a row
    /// whose key already exists fails with [`CoreError::AlreadyTracked`],
    /// updating or removing a missing row with [`CoreError::NotFound`].
    /// The queue drains even when the flush fails; changes after the
    /// failing one are discarded, and statements already executed stay
    /// applied unless a surrounding transaction rolls them back.
    pub fn save_changes(&mut self) -> CoreResult<u64> {
        let pending = mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(0);
        }
        debug!("flushing {} pending changes", pending.len());

        let lease = self.lease()?;
        let runner = StatementRunner::new(&lease, &self.cancel);
        let mut affected = 0u64;
        for change in &pending {
            let d = change.entry.descriptor()?;
            let key = key_values(&d, change.entry.as_ref())?;
            let probe = write::compile_exists(d.table(), key.clone());
            let exists = runner
                .query_scalar(&probe.sql, &probe.params)?
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
                > 0;

            match change.op {
                ChangeOp::Add => {
                    if exists {
                        return Err(CoreError::already_tracked(d.type_name(), render_key(&key)));
                    }
                    affected += self.insert_one(&runner, &d, change.entry.as_ref())?;
                }
                ChangeOp::Modify => {
                    if !exists {
                        return Err(CoreError::not_found(d.type_name(), render_key(&key)));
                    }
                    let set = non_key_values(&d, change.entry.as_ref())?;
                    let compiled = write::compile_update(d.table(), set, key)?;
                    affected += runner.execute(&compiled.sql, &compiled.params)?;
                }
                ChangeOp::Remove => {
                    if !exists {
                        return Err(CoreError::not_found(d.type_name(), render_key(&key)));
                    }
                    let compiled = write::compile_delete(d.table(), key);
                    affected += runner.execute(&compiled.sql, &compiled.params)?;
                }
            }
        }
        Ok(affected)
    }

    fn insert_one(
        &self,
        runner: &StatementRunner<'_>,
        d: &Arc<EntityDescriptor>,
        entry: &dyn ChangeEntry,
    ) -> CoreResult<u64> {
        let identity = d.identity_column().map(|c| c.name);
        let mut columns = Vec::with_capacity(d.columns().len());
        for column in d.columns() {
            if identity == Some(column.name) {
                continue;
            }
            columns.push((column.name, read_field(d, entry, column.name)?));
        }
        let compiled = write::compile_insert(d.table(), columns);
        let affected = runner.execute(&compiled.sql, &compiled.params)?;

        if let Some(identity_column) = d.identity_column() {
            let value = runner
                .query_scalar(self.driver.last_insert_id_sql(), &[])?
                .ok_or_else(|| {
                    CoreError::schema(d.type_name(), "identity value was not returned after insert")
                })?;
            let value = to_kind(value, identity_column.kind)?;
            if !entry.set_field(identity_column.name, value) {
                return Err(CoreError::schema(
                    d.type_name(),
                    format!("identity field {} is not settable", identity_column.name),
                ));
            }
        }
        Ok(affected)
    }

    // === Transactions ===

    /// Opens the session transaction connection and begins a transaction.
    ///
    /// Every call until [`commit`] or [`rollback`] runs on this one
    /// connection. Fails with [`CoreError::TransactionState`] when a
    /// transaction is already active.
    ///
    /// Dropping the session with the transaction still open closes the
    /// connection without committing; the database rolls the transaction
    /// back. Call [`commit`] explicitly for durability.
    ///
    /// [`commit`]: Session::commit
    /// [`rollback`]: Session::rollback
    pub fn begin_transaction(&mut self) -> CoreResult<()> {
        if self.txn.is_some() {
            return Err(CoreError::transaction_state("a transaction is already active"));
        }
        self.cancel.ensure()?;
        let mut conn = self.driver.connect(&self.config.connection_string)?;
        conn.begin()?;
        debug!("transaction started");
        self.txn = Some(Rc::new(RefCell::new(conn)));
        Ok(())
    }

    /// Commits the session transaction and releases its connection.
    pub fn commit(&mut self) -> CoreResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| CoreError::transaction_state("no active transaction to commit"))?;
        txn.borrow_mut().commit()?;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls the session transaction back and releases its connection.
    pub fn rollback(&mut self) -> CoreResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| CoreError::transaction_state("no active transaction to roll back"))?;
        txn.borrow_mut().rollback()?;
        debug!("transaction rolled back");
        Ok(())
    }

    fn lease(&self) -> CoreResult<ConnectionLease> {
        self.cancel.ensure()?;
        match &self.txn {
            Some(shared) => Ok(ConnectionLease::shared(Rc::clone(shared))),
            None => {
                let conn = self.driver.connect(&self.config.connection_string)?;
                Ok(ConnectionLease::owned(conn))
            }
        }
    }
}

fn key_values(
    d: &EntityDescriptor,
    entry: &dyn ChangeEntry,
) -> CoreResult<Vec<(&'static str, ScalarValue)>> {
    d.key_columns()
        .iter()
        .map(|column| Ok((column.name, read_field(d, entry, column.name)?)))
        .collect()
}

fn non_key_values(
    d: &EntityDescriptor,
    entry: &dyn ChangeEntry,
) -> CoreResult<Vec<(&'static str, ScalarValue)>> {
    d.columns()
        .iter()
        .filter(|column| !column.key)
        .map(|column| Ok((column.name, read_field(d, entry, column.name)?)))
        .collect()
}

fn read_field(
    d: &EntityDescriptor,
    entry: &dyn ChangeEntry,
    field: &str,
) -> CoreResult<ScalarValue> {
    entry
        .value_of(field)
        .ok_or_else(|| CoreError::schema(d.type_name(), format!("declared field {field} is unreadable")))
}

fn render_key(key: &[(&str, ScalarValue)]) -> String {
    key.iter()
        .map(|(_, value)| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
