//! # relq Core
//!
//! Query compilation and change tracking over any registered relq driver.
//!
//! This crate turns declarative query specs into dialect-aware SQL,
//! materializes result rows back into plain Rust structs, and queues entity
//! changes for a first-in-first-out flush. Sessions are strict about
//! connections: outside a transaction no connection survives the call that
//! opened it.
//!
//! ## Design Principles
//!
//! - Entities are plain structs; [`Entity`] describes their shape by value
//! - Queries are data ([`QuerySpec`]) and compile per driver dialect
//! - Joins come from navigation conventions, never from hand-written SQL
//! - Changes flush in registration order, checked against the database first
//!
//! ## Example
//!
//! ```rust
//! use relq_core::{
//!     Entity, EntityShape, FieldSpec, Filter, QuerySpec, ScalarKind, ScalarValue,
//!     Session, SessionConfig,
//! };
//!
//! #[derive(Debug, Default, Clone)]
//! struct Note {
//!     id: i64,
//!     body: String,
//! }
//!
//! impl Entity for Note {
//!     fn shape() -> EntityShape {
//!         EntityShape::new("Note")
//!             .field(FieldSpec::new("id", ScalarKind::Integer).key())
//!             .field(FieldSpec::new("body", ScalarKind::Text))
//!     }
//!
//!     fn get(&self, field: &str) -> Option<ScalarValue> {
//!         match field {
//!             "id" => Some(self.id.into()),
//!             "body" => Some(self.body.as_str().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: ScalarValue) -> bool {
//!         match field {
//!             "id" => self.id = value.as_integer().unwrap_or_default(),
//!             "body" => self.body = value.as_text().unwrap_or_default().to_string(),
//!             _ => return false,
//!         }
//!         true
//!     }
//! }
//!
//! let mut session = Session::open(SessionConfig::sqlite(":memory:")).unwrap();
//! session.begin_transaction().unwrap();
//! session
//!     .execute_raw("CREATE TABLE Note (id INTEGER PRIMARY KEY, body TEXT)", &[])
//!     .unwrap();
//!
//! let note = session.add(Note {
//!     body: "first note".into(),
//!     ..Note::default()
//! });
//! session.save_changes().unwrap();
//! assert!(note.value().id > 0);
//!
//! let notes: Vec<Note> = session
//!     .query(&QuerySpec::new().filter(Filter::contains("body", "first")))
//!     .unwrap();
//! assert_eq!(notes.len(), 1);
//! session.commit().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod exec;
mod query;
mod schema;
mod session;
mod sql;
mod track;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::SessionConfig;
pub use error::{CoreError, CoreResult};
pub use exec::CancelToken;
pub use query::{CompareOp, Filter, Operand, QuerySpec, SortDirection, SortKey, PAGE_ALL};
pub use schema::{
    descriptor, Entity, EntityDescriptor, EntityShape, FieldSpec, NavigationLink, NavigationSpec,
    TargetResolver,
};
pub use session::{PagedResult, Session};
pub use track::Tracked;

pub use relq_driver::{ScalarKind, ScalarValue, SqlParam};
