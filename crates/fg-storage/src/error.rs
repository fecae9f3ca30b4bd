//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Item not found.
    #[error("{entity_type} not found: {key}")]
    NotFound {
        /// Type of item (e.g., "Entity", "Group").
        entity_type: &'static str,
        /// Lookup key, rendered for display.
        key: String,
    },

    /// Duplicate item (unique constraint violation).
    #[error("Duplicate {entity_type}: '{key}' already exists")]
    Duplicate {
        /// Type of item.
        entity_type: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The operation is not valid for the current store state.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Backend connection error.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, key: impl ToString) -> Self {
        Self::Duplicate {
            entity_type,
            key: key.to_string(),
        }
    }

    /// Creates an invalid data error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
