//! Error types for the relq engine.

use thiserror::Error;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Native driver error, propagated unchanged.
    #[error("driver error: {0}")]
    Driver(#[from] relq_driver::DriverError),

    /// Session configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// An entity shape violates the mapping conventions.
    #[error("schema error on {entity}: {message}")]
    Schema {
        /// The entity type the shape belongs to.
        entity: String,
        /// Description of the violation.
        message: String,
    },

    /// A query specification cannot be rendered as SQL.
    #[error("translation error: {message}")]
    Translation {
        /// Description of the unsupported construct.
        message: String,
    },

    /// A database value cannot be coerced to the target kind.
    #[error("conversion error: cannot convert {from} to {to}")]
    Conversion {
        /// Kind of the source value.
        from: String,
        /// Kind of the target field.
        to: String,
    },

    /// An Add was queued for a primary key that already exists.
    #[error("already tracked: {entity} with key {key}")]
    AlreadyTracked {
        /// The entity type.
        entity: String,
        /// The conflicting key, rendered for diagnostics.
        key: String,
    },

    /// A Modify or Remove targeted a primary key that does not exist.
    #[error("not found: {entity} with key {key}")]
    NotFound {
        /// The entity type.
        entity: String,
        /// The missing key, rendered for diagnostics.
        key: String,
    },

    /// A transaction operation was issued in the wrong state.
    #[error("transaction state error: {message}")]
    TransactionState {
        /// Description of the state violation.
        message: String,
    },

    /// The operation was cancelled through the session token.
    #[error("operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a schema error.
    pub fn schema(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Creates a translation error.
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation {
            message: message.into(),
        }
    }

    /// Creates a conversion error.
    pub fn conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Conversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates an already-tracked error.
    pub fn already_tracked(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AlreadyTracked {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a transaction state error.
    pub fn transaction_state(message: impl Into<String>) -> Self {
        Self::TransactionState {
            message: message.into(),
        }
    }
}
