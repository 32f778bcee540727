//! Session configuration.

use crate::error::{CoreError, CoreResult};
use relq_driver::registry::SQLITE_PROVIDER;

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Registered provider name (for example `"sqlite"`).
    pub provider: String,

    /// Driver-specific connection string.
    pub connection_string: String,
}

impl SessionConfig {
    /// Creates a configuration for the given provider and connection string.
    #[must_use]
    pub fn new(provider: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            connection_string: connection_string.into(),
        }
    }

    /// Creates a configuration for the bundled SQLite driver.
    #[must_use]
    pub fn sqlite(connection_string: impl Into<String>) -> Self {
        Self::new(SQLITE_PROVIDER, connection_string)
    }

    /// Sets the provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Sets the connection string.
    #[must_use]
    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    /// Checks the configuration for values no driver can work with.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if the provider name or the
    /// connection string is empty.
    pub fn validate(&self) -> CoreResult<()> {
        if self.provider.trim().is_empty() {
            return Err(CoreError::configuration("provider name is empty"));
        }
        if self.connection_string.trim().is_empty() {
            return Err(CoreError::configuration("connection string is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_shortcut_sets_provider() {
        let config = SessionConfig::sqlite(":memory:");
        assert_eq!(config.provider, "sqlite");
        assert_eq!(config.connection_string, ":memory:");
    }

    #[test]
    fn builder_pattern() {
        let config = SessionConfig::sqlite(":memory:")
            .provider("other-db")
            .connection_string("server=localhost");
        assert_eq!(config.provider, "other-db");
        assert_eq!(config.connection_string, "server=localhost");
    }

    #[test]
    fn empty_values_fail_validation() {
        assert!(SessionConfig::new("", ":memory:").validate().is_err());
        assert!(SessionConfig::new("sqlite", "  ").validate().is_err());
        assert!(SessionConfig::sqlite(":memory:").validate().is_ok());
    }
}
