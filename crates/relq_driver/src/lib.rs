//! # relq Driver
//!
//! Driver traits and the bundled SQLite driver for relq.
//!
//! This crate is the lowest layer of relq: the boundary between the engine
//! and a concrete relational database. Drivers are **dumb pipes** - they
//! open connections, run parameterized SQL text, and hand rows back as
//! tagged scalar values. All SQL generation, schema knowledge, and change
//! tracking live above this crate.
//!
//! ## Design Principles
//!
//! - Drivers execute SQL text with named parameters; they never build SQL
//! - Row values cross the boundary as [`ScalarValue`], nothing else
//! - A driver owns its dialect quirks (paging clause, last-inserted-id query)
//! - Factories must be `Send + Sync`; connections are single-threaded
//!
//! ## Available Drivers
//!
//! - [`SqliteDriver`] - file-backed or in-memory SQLite via `rusqlite`,
//!   registered under the provider name `"sqlite"`
//!
//! ## Example
//!
//! ```rust
//! use relq_driver::{registry, ScalarValue};
//!
//! let driver = registry::resolve("sqlite").unwrap();
//! let mut conn = driver.connect(":memory:").unwrap();
//!
//! conn.execute("CREATE TABLE t (x INTEGER)", &[]).unwrap();
//! let affected = conn
//!     .execute(
//!         "INSERT INTO t (x) VALUES (@p0)",
//!         &[("@p0".to_string(), ScalarValue::Integer(7))],
//!     )
//!     .unwrap();
//! assert_eq!(affected, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
pub mod registry;
mod sqlite;
mod value;

pub use driver::{RowVisitor, SqlConnection, SqlDriver, SqlParam, SqlRow};
pub use error::{DriverError, DriverResult};
pub use sqlite::SqliteDriver;
pub use value::{ScalarKind, ScalarValue};
