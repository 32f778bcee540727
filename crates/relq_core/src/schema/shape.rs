//! Entity shape declaration.
//!
//! An entity type describes its mapped shape once, declaratively; the
//! resolver turns the shape into a cached [`EntityDescriptor`] by applying
//! the naming conventions.

use std::sync::Arc;

use relq_driver::{ScalarKind, ScalarValue};

use crate::error::CoreResult;
use crate::schema::descriptor::EntityDescriptor;

/// Resolver function yielding the descriptor of a navigation's target type.
///
/// Stored as a plain function pointer so shapes can reference each other
/// (including mutually) without recursing while descriptors are built.
pub type TargetResolver = fn() -> CoreResult<Arc<EntityDescriptor>>;

/// A persisted type that the engine can query and flush.
///
/// `shape` declares the mapped fields and navigations; `get` and `set` move
/// scalar values in and out by field name. `Default` supplies the blank
/// instance rows are materialized into.
pub trait Entity: Default + 'static {
    /// Declares the entity's mapped shape.
    fn shape() -> EntityShape;

    /// Reads the named field as a scalar value.
    ///
    /// Returns `None` for names the type does not map.
    fn get(&self, field: &str) -> Option<ScalarValue>;

    /// Writes the named field from a scalar value.
    ///
    /// The value has already been converted to the field's declared kind.
    /// Returns `false` for names the type does not map.
    fn set(&mut self, field: &str, value: ScalarValue) -> bool;
}

/// A mapped scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name.
    pub name: &'static str,

    /// Scalar kind stored in the column.
    pub kind: ScalarKind,

    /// Whether the field is part of the primary key.
    pub key: bool,

    /// Whether key values are assigned by the application rather than
    /// generated by the database.
    pub assigned: bool,
}

impl FieldSpec {
    /// Creates a field with the given name and kind.
    #[must_use]
    pub const fn new(name: &'static str, kind: ScalarKind) -> Self {
        Self {
            name,
            kind,
            key: false,
            assigned: false,
        }
    }

    /// Marks the field as part of the primary key.
    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Marks the key value as application-assigned.
    #[must_use]
    pub const fn assigned(mut self) -> Self {
        self.assigned = true;
        self
    }
}

/// A declared navigation to another entity type.
#[derive(Debug, Clone, Copy)]
pub struct NavigationSpec {
    /// Navigation name, used in member paths and include lists.
    pub name: &'static str,

    /// Declared foreign-key column; `None` falls back to the
    /// `<name-lowercased>_id` convention.
    pub foreign_key: Option<&'static str>,

    /// Resolver for the target type's descriptor.
    pub target: TargetResolver,
}

impl NavigationSpec {
    /// Creates a navigation resolving its target through `target`.
    #[must_use]
    pub const fn new(name: &'static str, target: TargetResolver) -> Self {
        Self {
            name,
            foreign_key: None,
            target,
        }
    }

    /// Declares the foreign-key column explicitly.
    #[must_use]
    pub const fn foreign_key(mut self, column: &'static str) -> Self {
        self.foreign_key = Some(column);
        self
    }
}

/// The declared shape of an entity type.
#[derive(Debug, Clone)]
pub struct EntityShape {
    /// Declared type name; doubles as the table name unless overridden.
    pub type_name: &'static str,

    /// Explicit table name override.
    pub table: Option<&'static str>,

    /// Mapped fields in declaration order.
    pub fields: Vec<FieldSpec>,

    /// Declared navigations.
    pub navigations: Vec<NavigationSpec>,
}

impl EntityShape {
    /// Creates an empty shape for the given type name.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table: None,
            fields: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Overrides the table name.
    #[must_use]
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Appends a mapped field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a navigation.
    #[must_use]
    pub fn navigation(mut self, navigation: NavigationSpec) -> Self {
        self.navigations.push(navigation);
        self
    }
}
