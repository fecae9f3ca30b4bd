//! CLI error types.

use fg_translation::TranslationError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A translation profile could not be loaded or run.
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    /// One or more profiles failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<fg_core::Error> for CliError {
    fn from(e: fg_core::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
