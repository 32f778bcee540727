//! Compiled statement artifacts.

use relq_driver::SqlParam;

/// Result-set column name carrying the piggybacked total row count.
pub(crate) const TOTAL_COLUMN: &str = "__total";

/// A statement compiled for one execution: SQL text plus its bound named
/// parameters. Built per call and discarded after use.
#[derive(Debug)]
pub(crate) struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
    /// Set when the projection carries the synthetic total-count column.
    pub total_column: Option<&'static str>,
}

impl CompiledQuery {
    pub fn new(sql: String, params: Vec<SqlParam>) -> Self {
        Self {
            sql,
            params,
            total_column: None,
        }
    }

    pub fn with_total(sql: String, params: Vec<SqlParam>) -> Self {
        Self {
            sql,
            params,
            total_column: Some(TOTAL_COLUMN),
        }
    }
}
