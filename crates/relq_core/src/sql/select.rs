//! SELECT compilation: projection, join inference, sorting, paging.

use std::sync::Arc;

use relq_driver::{ScalarValue, SqlDriver};

use crate::error::{CoreError, CoreResult};
use crate::query::{Filter, QuerySpec, SortDirection, SortKey, PAGE_ALL};
use crate::schema::{EntityDescriptor, NavigationLink};
use crate::sql::alias::AliasMap;
use crate::sql::compiled::CompiledQuery;
use crate::sql::params::{quote, quote_qualified, ParamList};
use crate::sql::translate::render_filter;
use crate::sql::TOTAL_COLUMN;

struct QueryParts {
    aliases: AliasMap,
    from_joins: String,
    where_sql: Option<String>,
    params: ParamList,
}

/// Compiles a list query for `spec`.
pub(crate) fn compile(
    root: &Arc<EntityDescriptor>,
    spec: &QuerySpec,
    driver: &dyn SqlDriver,
) -> CoreResult<CompiledQuery> {
    let mut parts = build_parts(root, spec.filter.as_ref(), &spec.includes)?;
    let select_list = projection(&parts.aliases);
    let order = order_by(&parts.aliases, &spec.sort)?;
    let page = paging(spec, driver, &mut parts.params)?;

    let mut sql = format!("SELECT {select_list} {}", parts.from_joins);
    if let Some(where_sql) = &parts.where_sql {
        sql.push_str(" WHERE ");
        sql.push_str(where_sql);
    }
    sql.push(' ');
    sql.push_str(&order);
    if let Some(page) = page {
        sql.push(' ');
        sql.push_str(&page);
    }
    Ok(CompiledQuery::new(sql, parts.params.into_params()))
}

/// Compiles a list query that additionally projects the total filtered row
/// count as a synthetic column, so one round trip answers both the page and
/// the total.
pub(crate) fn compile_paged(
    root: &Arc<EntityDescriptor>,
    spec: &QuerySpec,
    driver: &dyn SqlDriver,
) -> CoreResult<CompiledQuery> {
    let mut parts = build_parts(root, spec.filter.as_ref(), &spec.includes)?;
    let select_list = projection(&parts.aliases);
    let order = order_by(&parts.aliases, &spec.sort)?;

    // The count subquery repeats the FROM/JOIN/WHERE text verbatim; its
    // parameter names are the same, so the bindings are shared.
    let mut count_sub = format!("SELECT COUNT(*) AS {} {}", quote(TOTAL_COLUMN), parts.from_joins);
    if let Some(where_sql) = &parts.where_sql {
        count_sub.push_str(" WHERE ");
        count_sub.push_str(where_sql);
    }

    let page = paging(spec, driver, &mut parts.params)?;

    let mut sql = format!(
        "SELECT {select_list}, {} AS {} {} CROSS JOIN ({count_sub}) AS {}",
        quote_qualified("__cnt", TOTAL_COLUMN),
        quote(TOTAL_COLUMN),
        parts.from_joins,
        quote("__cnt"),
    );
    if let Some(where_sql) = &parts.where_sql {
        sql.push_str(" WHERE ");
        sql.push_str(where_sql);
    }
    sql.push(' ');
    sql.push_str(&order);
    if let Some(page) = page {
        sql.push(' ');
        sql.push_str(&page);
    }
    Ok(CompiledQuery::with_total(sql, parts.params.into_params()))
}

/// Compiles a bare `COUNT(*)` over the filtered rows.
pub(crate) fn compile_count(
    root: &Arc<EntityDescriptor>,
    filter: Option<&Filter>,
) -> CoreResult<CompiledQuery> {
    let parts = build_parts(root, filter, &[])?;
    let mut sql = format!("SELECT COUNT(*) {}", parts.from_joins);
    if let Some(where_sql) = &parts.where_sql {
        sql.push_str(" WHERE ");
        sql.push_str(where_sql);
    }
    Ok(CompiledQuery::new(sql, parts.params.into_params()))
}

fn build_parts(
    root: &Arc<EntityDescriptor>,
    filter: Option<&Filter>,
    includes: &[String],
) -> CoreResult<QueryParts> {
    let mut aliases = AliasMap::new(Arc::clone(root));

    if includes.is_empty() {
        // No explicit fetch paths: join every navigation whose target
        // resolves with a single-column key and whose foreign key exists.
        for link in root.navigations() {
            try_join(&mut aliases, link);
        }
    } else {
        // Explicit fetch paths: join only what was requested and is
        // foreign-key-resolvable; the rest is skipped, not an error.
        for path in includes {
            if let Some(link) = root.navigation(path) {
                try_join(&mut aliases, link);
            }
        }
    }

    let mut from_joins = format!("FROM {} AS {}", quote(root.table()), quote(AliasMap::ROOT));
    for join in aliases.joins() {
        from_joins.push_str(&format!(
            " LEFT OUTER JOIN {} AS {} ON {} = {}",
            quote(join.target.table()),
            quote(&join.alias),
            quote_qualified(AliasMap::ROOT, join.foreign_key),
            quote_qualified(&join.alias, join.target_key),
        ));
    }

    let mut params = ParamList::new();
    let where_sql = match filter {
        Some(filter) => Some(render_filter(filter, &aliases, &mut params)?),
        None => None,
    };

    Ok(QueryParts {
        aliases,
        from_joins,
        where_sql,
        params,
    })
}

fn try_join(aliases: &mut AliasMap, link: &NavigationLink) {
    if aliases.is_joined(link.name()) {
        return;
    }
    let Some(foreign_key) = link.foreign_key() else {
        return;
    };
    let Ok(target) = link.target_descriptor() else {
        return;
    };
    let keys = target.key_columns();
    let [key] = keys.as_slice() else {
        return;
    };
    let target_key = key.name;
    aliases.push_join(link.name(), foreign_key, target_key, target);
}

fn projection(aliases: &AliasMap) -> String {
    let mut columns: Vec<String> = Vec::new();
    for column in aliases.root().columns() {
        columns.push(format!(
            "{} AS {}",
            quote_qualified(AliasMap::ROOT, column.name),
            quote(&format!("{}_{}", AliasMap::ROOT, column.name)),
        ));
    }
    for join in aliases.joins() {
        for column in join.target.columns() {
            columns.push(format!(
                "{} AS {}",
                quote_qualified(&join.alias, column.name),
                quote(&format!("{}_{}", join.alias, column.name)),
            ));
        }
    }
    columns.join(", ")
}

fn order_by(aliases: &AliasMap, sort: &[SortKey]) -> CoreResult<String> {
    let mut keys: Vec<String> = Vec::new();
    if sort.is_empty() {
        // Deterministic paging needs a total order; fall back to the
        // primary key.
        for key in aliases.root().key_columns() {
            keys.push(format!("{} ASC", quote_qualified(AliasMap::ROOT, key.name)));
        }
    } else {
        for sort_key in sort {
            let (column, _) = aliases.resolve_member(&sort_key.member)?;
            let direction = match sort_key.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            keys.push(format!("{column} {direction}"));
        }
    }
    Ok(format!("ORDER BY {}", keys.join(", ")))
}

fn paging(
    spec: &QuerySpec,
    driver: &dyn SqlDriver,
    params: &mut ParamList,
) -> CoreResult<Option<String>> {
    if spec.page_size < PAGE_ALL {
        return Err(CoreError::translation(format!(
            "page size {} must be -1 or non-negative",
            spec.page_size
        )));
    }
    if spec.page_size == PAGE_ALL {
        return Ok(None);
    }
    if spec.page_index < 0 {
        return Err(CoreError::translation(format!(
            "page index {} must be non-negative",
            spec.page_index
        )));
    }
    let offset = spec
        .page_index
        .checked_mul(spec.page_size)
        .ok_or_else(|| CoreError::translation("page window overflows"))?;
    let offset_param = params.bind(ScalarValue::Integer(offset));
    let size_param = params.bind(ScalarValue::Integer(spec.page_size));
    Ok(Some(driver.paging_clause(&offset_param, &size_param)))
}
