//! Error types for driver operations.

use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur inside a database driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No driver is registered under the requested provider name.
    #[error("unknown provider: {name}")]
    UnknownProvider {
        /// The provider name that was looked up.
        name: String,
    },

    /// The connection could not be established.
    #[error("connect failed: {message}")]
    Connect {
        /// Description of the failure.
        message: String,
    },

    /// A statement referenced a parameter that was not supplied, or a
    /// supplied parameter does not occur in the statement text.
    #[error("parameter mismatch: {name} in statement")]
    ParameterMismatch {
        /// The parameter name in question.
        name: String,
    },

    /// A row value was requested at an index past the last column.
    #[error("column index {index} out of range ({count} columns)")]
    ColumnOutOfRange {
        /// The requested column index.
        index: usize,
        /// The number of columns in the row.
        count: usize,
    },

    /// Native SQLite error, propagated unchanged.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DriverError {
    /// Creates an unknown-provider error.
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    /// Creates a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a parameter-mismatch error.
    pub fn parameter_mismatch(name: impl Into<String>) -> Self {
        Self::ParameterMismatch { name: name.into() }
    }
}
