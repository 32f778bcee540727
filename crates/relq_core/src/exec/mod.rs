//! Statement execution: connection leases, value conversion, cancellation.

mod cancel;
mod convert;
mod executor;

pub use cancel::CancelToken;

pub(crate) use convert::to_kind;
pub(crate) use executor::{materialize, ConnectionLease, StatementRunner};
