//! Tracked entity handles and the pending change queue.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use relq_driver::ScalarValue;

use crate::error::CoreResult;
use crate::schema::{descriptor, Entity, EntityDescriptor};

/// A shared handle to an entity registered with a session.
///
/// Cloning the handle shares the underlying instance: changes made through
/// one clone are visible to every other clone and to the session when it
/// flushes. Identity write-back after an insert lands in the same shared
/// instance.
pub struct Tracked<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Tracked<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Borrows the tracked instance immutably.
    ///
    /// Panics if a mutable borrow from [`Tracked::value_mut`] is still live.
    pub fn value(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Borrows the tracked instance mutably.
    ///
    /// Panics if any other borrow of this handle is still live.
    pub fn value_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }
}

impl<T> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.inner.borrow()).finish()
    }
}

/// Type-erased access to one tracked entity during a flush.
pub(crate) trait ChangeEntry {
    /// Resolves the descriptor of the tracked entity type.
    fn descriptor(&self) -> CoreResult<Arc<EntityDescriptor>>;

    /// Reads a declared field from the tracked instance.
    fn value_of(&self, field: &str) -> Option<ScalarValue>;

    /// Writes a declared field back into the tracked instance.
    fn set_field(&self, field: &str, value: ScalarValue) -> bool;
}

pub(crate) struct TrackedEntry<T: Entity> {
    handle: Tracked<T>,
}

impl<T: Entity> TrackedEntry<T> {
    pub fn boxed(handle: &Tracked<T>) -> Box<dyn ChangeEntry> {
        Box::new(Self {
            handle: handle.clone(),
        })
    }
}

impl<T: Entity> ChangeEntry for TrackedEntry<T> {
    fn descriptor(&self) -> CoreResult<Arc<EntityDescriptor>> {
        descriptor::<T>()
    }

    fn value_of(&self, field: &str) -> Option<ScalarValue> {
        self.handle.value().get(field)
    }

    fn set_field(&self, field: &str, value: ScalarValue) -> bool {
        self.handle.value_mut().set(field, value)
    }
}

/// The kind of mutation queued for a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeOp {
    Add,
    Modify,
    Remove,
}

/// One queued mutation, flushed in registration order.
pub(crate) struct PendingChange {
    pub op: ChangeOp,
    pub entry: Box<dyn ChangeEntry>,
}

impl PendingChange {
    pub fn new(op: ChangeOp, entry: Box<dyn ChangeEntry>) -> Self {
        Self { op, entry }
    }
}
