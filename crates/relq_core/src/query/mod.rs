//! Declarative query specifications.

mod filter;
mod spec;

pub use filter::{CompareOp, Filter, Operand};
pub use spec::{QuerySpec, SortDirection, SortKey, PAGE_ALL};
