//! Table alias management and member path resolution.

use std::sync::Arc;

use relq_driver::ScalarKind;

use crate::error::{CoreError, CoreResult};
use crate::schema::EntityDescriptor;
use crate::sql::params::quote_qualified;

/// A navigation joined into the current query.
#[derive(Debug, Clone)]
pub(crate) struct JoinedNav {
    pub name: &'static str,
    pub alias: String,
    pub target: Arc<EntityDescriptor>,
    pub foreign_key: &'static str,
    /// The target's single key column, joined against the foreign key.
    pub target_key: &'static str,
}

/// Aliases for one compilation: the root is always `t0`, joins take `t1`,
/// `t2`, … in join order.
#[derive(Debug, Clone)]
pub(crate) struct AliasMap {
    root: Arc<EntityDescriptor>,
    joins: Vec<JoinedNav>,
}

impl AliasMap {
    pub const ROOT: &'static str = "t0";

    pub fn new(root: Arc<EntityDescriptor>) -> Self {
        Self {
            root,
            joins: Vec::new(),
        }
    }

    pub fn root(&self) -> &Arc<EntityDescriptor> {
        &self.root
    }

    pub fn joins(&self) -> &[JoinedNav] {
        &self.joins
    }

    pub fn is_joined(&self, navigation: &str) -> bool {
        self.joins.iter().any(|j| j.name == navigation)
    }

    /// Joins a navigation, allocating the next alias.
    pub fn push_join(
        &mut self,
        name: &'static str,
        foreign_key: &'static str,
        target_key: &'static str,
        target: Arc<EntityDescriptor>,
    ) {
        let alias = format!("t{}", self.joins.len() + 1);
        self.joins.push(JoinedNav {
            name,
            alias,
            target,
            foreign_key,
            target_key,
        });
    }

    /// Resolves a member path to a quoted `[alias].[column]` reference and
    /// the column's declared kind.
    ///
    /// Paths are a bare field name or one navigation deep
    /// (`"Publisher.name"`); the navigation must be joined in this query.
    pub fn resolve_member(&self, path: &str) -> CoreResult<(String, ScalarKind)> {
        match path.split_once('.') {
            None => {
                let column = self.root.column(path).ok_or_else(|| {
                    CoreError::translation(format!(
                        "unknown field {path} on {}",
                        self.root.type_name()
                    ))
                })?;
                Ok((quote_qualified(Self::ROOT, column.name), column.kind))
            }
            Some((navigation, field)) => {
                if field.contains('.') {
                    return Err(CoreError::translation(format!(
                        "nested navigation path {path} is not supported"
                    )));
                }
                let joined = self.joins.iter().find(|j| j.name == navigation);
                let Some(joined) = joined else {
                    return if self.root.navigation(navigation).is_some() {
                        Err(CoreError::translation(format!(
                            "navigation {navigation} is not joined in this query"
                        )))
                    } else {
                        Err(CoreError::translation(format!(
                            "unknown navigation {navigation} on {}",
                            self.root.type_name()
                        )))
                    };
                };
                let column = joined.target.column(field).ok_or_else(|| {
                    CoreError::translation(format!(
                        "unknown field {field} on {}",
                        joined.target.type_name()
                    ))
                })?;
                Ok((quote_qualified(&joined.alias, column.name), column.kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Book;
    use crate::schema::descriptor;

    fn book_aliases_with_publisher() -> AliasMap {
        let root = descriptor::<Book>().unwrap();
        let mut aliases = AliasMap::new(Arc::clone(&root));
        let link = *root.navigation("Publisher").unwrap();
        let target = link.target_descriptor().unwrap();
        aliases.push_join(link.name(), link.foreign_key().unwrap(), "id", target);
        aliases
    }

    #[test]
    fn root_member_resolves_to_t0() {
        let aliases = book_aliases_with_publisher();
        let (sql, kind) = aliases.resolve_member("title").unwrap();
        assert_eq!(sql, "[t0].[title]");
        assert_eq!(kind, ScalarKind::Text);
    }

    #[test]
    fn navigation_member_resolves_to_join_alias() {
        let aliases = book_aliases_with_publisher();
        let (sql, kind) = aliases.resolve_member("Publisher.name").unwrap();
        assert_eq!(sql, "[t1].[name]");
        assert_eq!(kind, ScalarKind::Text);
    }

    #[test]
    fn unknown_field_fails() {
        let aliases = book_aliases_with_publisher();
        let err = aliases.resolve_member("missing").unwrap_err();
        assert!(matches!(err, CoreError::Translation { .. }));
    }

    #[test]
    fn unjoined_navigation_fails() {
        let root = descriptor::<Book>().unwrap();
        let aliases = AliasMap::new(root);
        let err = aliases.resolve_member("Publisher.name").unwrap_err();
        assert!(matches!(err, CoreError::Translation { .. }));
    }

    #[test]
    fn unknown_navigation_fails() {
        let aliases = book_aliases_with_publisher();
        let err = aliases.resolve_member("Warehouse.name").unwrap_err();
        assert!(matches!(err, CoreError::Translation { .. }));
    }

    #[test]
    fn nested_path_fails() {
        let aliases = book_aliases_with_publisher();
        let err = aliases.resolve_member("Publisher.Country.name").unwrap_err();
        assert!(matches!(err, CoreError::Translation { .. }));
    }
}
