//! SQL compilation: predicate translation, select building, write statements.

mod alias;
mod compiled;
mod params;
mod translate;

pub(crate) mod select;
pub(crate) mod write;

pub(crate) use alias::AliasMap;
pub(crate) use compiled::{CompiledQuery, TOTAL_COLUMN};
