//! Write statement compilation keyed by primary key.

use relq_driver::ScalarValue;

use crate::error::{CoreError, CoreResult};
use crate::sql::compiled::CompiledQuery;
use crate::sql::params::{quote, ParamList};

/// Column name paired with the value to bind.
pub(crate) type ColumnValue<'a> = (&'a str, ScalarValue);

/// Compiles an INSERT over the given columns.
///
/// An empty column list (an identity key and nothing else) inserts the
/// database defaults.
pub(crate) fn compile_insert(table: &str, columns: Vec<ColumnValue<'_>>) -> CompiledQuery {
    if columns.is_empty() {
        return CompiledQuery::new(format!("INSERT INTO {} DEFAULT VALUES", quote(table)), Vec::new());
    }

    let mut params = ParamList::new();
    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    let mut values: Vec<String> = Vec::with_capacity(columns.len());
    for (name, value) in columns {
        names.push(quote(name));
        values.push(params.bind(value));
    }
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        names.join(", "),
        values.join(", "),
    );
    CompiledQuery::new(sql, params.into_params())
}

/// Compiles an UPDATE of the non-key columns, keyed by primary key.
///
/// # Errors
///
/// Returns a translation error when there is nothing to set.
pub(crate) fn compile_update(
    table: &str,
    set: Vec<ColumnValue<'_>>,
    key: Vec<ColumnValue<'_>>,
) -> CoreResult<CompiledQuery> {
    if set.is_empty() {
        return Err(CoreError::translation(format!(
            "update of {table} has no non-key columns to set"
        )));
    }

    let mut params = ParamList::new();
    let assignments: Vec<String> = set
        .into_iter()
        .map(|(name, value)| format!("{} = {}", quote(name), params.bind(value)))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        quote(table),
        assignments.join(", "),
        key_predicate(key, &mut params),
    );
    Ok(CompiledQuery::new(sql, params.into_params()))
}

/// Compiles a DELETE keyed by primary key.
pub(crate) fn compile_delete(table: &str, key: Vec<ColumnValue<'_>>) -> CompiledQuery {
    let mut params = ParamList::new();
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        quote(table),
        key_predicate(key, &mut params),
    );
    CompiledQuery::new(sql, params.into_params())
}

/// Compiles the existence probe used before every queued write.
pub(crate) fn compile_exists(table: &str, key: Vec<ColumnValue<'_>>) -> CompiledQuery {
    let mut params = ParamList::new();
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        quote(table),
        key_predicate(key, &mut params),
    );
    CompiledQuery::new(sql, params.into_params())
}

fn key_predicate(key: Vec<ColumnValue<'_>>, params: &mut ParamList) -> String {
    key.into_iter()
        .map(|(name, value)| format!("{} = {}", quote(name), params.bind(value)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_binds_each_column() {
        let compiled = compile_insert(
            "Book",
            vec![
                ("title", ScalarValue::Text("Dune".into())),
                ("pages", ScalarValue::Integer(412)),
            ],
        );
        assert_eq!(compiled.sql, "INSERT INTO [Book] ([title], [pages]) VALUES (@p0, @p1)");
        assert_eq!(compiled.params.len(), 2);
    }

    #[test]
    fn empty_insert_uses_default_values() {
        let compiled = compile_insert("Counter", Vec::new());
        assert_eq!(compiled.sql, "INSERT INTO [Counter] DEFAULT VALUES");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn update_sets_columns_and_keys_the_where() {
        let compiled = compile_update(
            "Book",
            vec![("title", ScalarValue::Text("Dune".into()))],
            vec![("id", ScalarValue::Integer(7))],
        )
        .unwrap();
        assert_eq!(compiled.sql, "UPDATE [Book] SET [title] = @p0 WHERE [id] = @p1");
    }

    #[test]
    fn update_without_settable_columns_fails() {
        let err = compile_update("Pair", Vec::new(), vec![("id", ScalarValue::Integer(1))])
            .unwrap_err();
        assert!(matches!(err, CoreError::Translation { .. }));
    }

    #[test]
    fn composite_keys_join_with_and() {
        let compiled = compile_delete(
            "Shipment",
            vec![
                ("order_id", ScalarValue::Integer(1)),
                ("line_no", ScalarValue::Integer(2)),
            ],
        );
        assert_eq!(
            compiled.sql,
            "DELETE FROM [Shipment] WHERE [order_id] = @p0 AND [line_no] = @p1"
        );
    }

    #[test]
    fn exists_probe_counts_by_key() {
        let compiled = compile_exists("Book", vec![("id", ScalarValue::Integer(3))]);
        assert_eq!(compiled.sql, "SELECT COUNT(*) FROM [Book] WHERE [id] = @p0");
    }
}
