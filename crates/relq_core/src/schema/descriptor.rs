//! Resolved entity descriptors.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::schema::shape::{FieldSpec, TargetResolver};

/// A navigation link resolved against the source entity's columns.
#[derive(Debug, Clone, Copy)]
pub struct NavigationLink {
    name: &'static str,
    foreign_key: Option<&'static str>,
    target: TargetResolver,
}

impl NavigationLink {
    pub(crate) const fn new(
        name: &'static str,
        foreign_key: Option<&'static str>,
        target: TargetResolver,
    ) -> Self {
        Self {
            name,
            foreign_key,
            target,
        }
    }

    /// Navigation name as declared.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The foreign-key column on the source table, if one was located.
    ///
    /// `None` means the navigation is unresolvable: neither the declared
    /// column nor the conventional one exists on the source.
    #[must_use]
    pub const fn foreign_key(&self) -> Option<&'static str> {
        self.foreign_key
    }

    /// Resolves the target type's descriptor.
    ///
    /// # Errors
    ///
    /// Returns the target type's schema error if its shape does not resolve.
    pub fn target_descriptor(&self) -> CoreResult<Arc<EntityDescriptor>> {
        (self.target)()
    }
}

/// The resolved, immutable mapping of one entity type.
///
/// Built once per type by the resolver and shared process-wide behind an
/// `Arc`; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    type_name: &'static str,
    table: &'static str,
    columns: Vec<FieldSpec>,
    key: Vec<usize>,
    identity: bool,
    navigations: Vec<NavigationLink>,
}

impl EntityDescriptor {
    pub(crate) fn new(
        type_name: &'static str,
        table: &'static str,
        columns: Vec<FieldSpec>,
        key: Vec<usize>,
        identity: bool,
        navigations: Vec<NavigationLink>,
    ) -> Self {
        Self {
            type_name,
            table,
            columns,
            key,
            identity,
            navigations,
        }
    }

    /// The declared type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The mapped table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Mapped columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[FieldSpec] {
        &self.columns
    }

    /// Looks up a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&FieldSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary-key columns in declaration order.
    #[must_use]
    pub fn key_columns(&self) -> Vec<&FieldSpec> {
        self.key.iter().map(|&i| &self.columns[i]).collect()
    }

    /// Whether the primary key is a single database-generated integer.
    #[must_use]
    pub const fn has_identity(&self) -> bool {
        self.identity
    }

    /// The identity column, when [`Self::has_identity`] holds.
    #[must_use]
    pub fn identity_column(&self) -> Option<&FieldSpec> {
        if self.identity {
            Some(&self.columns[self.key[0]])
        } else {
            None
        }
    }

    /// Declared navigations.
    #[must_use]
    pub fn navigations(&self) -> &[NavigationLink] {
        &self.navigations
    }

    /// Looks up a navigation by exact name.
    #[must_use]
    pub fn navigation(&self, name: &str) -> Option<&NavigationLink> {
        self.navigations.iter().find(|n| n.name == name)
    }
}
