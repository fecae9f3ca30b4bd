//! Translation error types.
//!
//! Policy violations are kept apart from configuration errors so that the
//! caller can deny a login without treating it as a misconfiguration.

use std::fmt;

use fg_storage::StorageError;
use thiserror::Error;

/// Reason a translation was stopped by policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// An identity mapped with `REQUIRE_MATCH` is not in the local store.
    RequiredIdentityMissing(String),
    /// Mapped identities resolve to two different local entities.
    AmbiguousPrincipal,
    /// The profile produced no usable identity.
    AnonymousPrincipal,
    /// A group mapped with `REQUIRE_EXISTING_GROUP` does not exist.
    RequiredGroupMissing(String),
    /// Merging into an existing entity, but there is nothing to add.
    NothingToMerge,
    /// Merging into an existing entity, but a mapped identity already exists.
    IdentityAlreadyPresent(String),
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredIdentityMissing(id) => {
                write!(f, "required identity {id} is not present locally")
            }
            Self::AmbiguousPrincipal => {
                write!(f, "mapped identities belong to different local entities")
            }
            Self::AnonymousPrincipal => write!(f, "no identity was mapped for the principal"),
            Self::RequiredGroupMissing(group) => write!(f, "required group {group} is missing"),
            Self::NothingToMerge => write!(f, "no identity to merge into the existing entity"),
            Self::IdentityAlreadyPresent(id) => {
                write!(f, "identity {id} is already present locally")
            }
        }
    }
}

/// Errors that can occur during translation and reconciliation.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The attempt was stopped by a profile policy.
    #[error("Execution break: {0}")]
    ExecutionBreak(PolicyViolation),

    /// Invalid profile or action configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed or failing expression.
    #[error("Expression error: {0}")]
    Expression(String),

    /// Local store failure, passed through unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TranslationError {
    /// Creates an execution break.
    #[must_use]
    pub const fn execution_break(reason: PolicyViolation) -> Self {
        Self::ExecutionBreak(reason)
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an expression error.
    #[must_use]
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    /// Checks if this is an execution break.
    #[must_use]
    pub const fn is_execution_break(&self) -> bool {
        matches!(self, Self::ExecutionBreak(_))
    }

    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Expression(_))
    }

    /// Returns the policy violation, if this is an execution break.
    #[must_use]
    pub const fn policy_violation(&self) -> Option<&PolicyViolation> {
        match self {
            Self::ExecutionBreak(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type for translation operations.
pub type TranslationResult<T> = Result<T, TranslationError>;
