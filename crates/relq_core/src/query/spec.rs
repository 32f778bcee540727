//! Query specification: filter, sort, page window, includes.

use crate::query::filter::Filter;

/// Page-size sentinel disabling paging.
pub const PAGE_ALL: i64 = -1;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Member path, resolved like filter members.
    pub member: String,
    /// Direction.
    pub direction: SortDirection,
}

/// A declarative query over one entity type.
///
/// Specs are stateless descriptions; compiling one never mutates it, so a
/// spec can be reused across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Filter predicate; `None` selects every row.
    pub filter: Option<Filter>,

    /// Sort keys in priority order; empty falls back to primary-key
    /// ascending.
    pub sort: Vec<SortKey>,

    /// Zero-based page index.
    pub page_index: i64,

    /// Page size; [`PAGE_ALL`] disables paging.
    pub page_size: i64,

    /// Navigation names to fetch alongside the root.
    pub includes: Vec<String>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filter: None,
            sort: Vec::new(),
            page_index: 0,
            page_size: PAGE_ALL,
            includes: Vec::new(),
        }
    }
}

impl QuerySpec {
    /// Creates an unfiltered, unpaged spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter predicate.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Appends an ascending sort key.
    #[must_use]
    pub fn sort_by(mut self, member: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            member: member.into(),
            direction: SortDirection::Ascending,
        });
        self
    }

    /// Appends a descending sort key.
    #[must_use]
    pub fn sort_by_desc(mut self, member: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            member: member.into(),
            direction: SortDirection::Descending,
        });
        self
    }

    /// Sets the page window.
    #[must_use]
    pub fn page(mut self, index: i64, size: i64) -> Self {
        self.page_index = index;
        self.page_size = size;
        self
    }

    /// Appends a navigation to fetch.
    #[must_use]
    pub fn include(mut self, navigation: impl Into<String>) -> Self {
        self.includes.push(navigation.into());
        self
    }

    /// Whether this spec requests a bounded page.
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.page_size != PAGE_ALL
    }
}
