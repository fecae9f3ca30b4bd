//! Error handling for the federation gateway core.
//!
//! Error messages are informative for operators while not exposing
//! remote assertion contents to end users.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns whether this error is caused by the operator's configuration.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_is_generic() {
        let error = Error::Internal;
        assert_eq!(error.to_string(), "internal error");
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(Error::config("bad").is_config_error());
        assert!(Error::Validation("x".into()).is_config_error());
        assert!(!Error::Internal.is_config_error());
    }
}
