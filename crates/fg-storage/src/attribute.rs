//! Attribute storage provider trait.

use async_trait::async_trait;
use fg_model::{syntax, Attribute, AttributeExt};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for attribute storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait AttributeProvider: Send + Sync {
    /// Gets all attributes of an entity, in all groups.
    async fn get_all_attributes(&self, entity: Uuid) -> StorageResult<Vec<AttributeExt>>;

    /// Creates an attribute.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the attribute already exists.
    async fn create_attribute(&self, entity: Uuid, attribute: &Attribute) -> StorageResult<()>;

    /// Creates or overwrites an attribute.
    async fn set_attribute(&self, entity: Uuid, attribute: &Attribute) -> StorageResult<()>;

    /// Removes an attribute.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the attribute doesn't exist.
    async fn remove_attribute(&self, entity: Uuid, group_path: &str, name: &str)
        -> StorageResult<()>;

    /// Compares two raw values under a value syntax.
    fn values_equal(&self, value_syntax: &str, a: &str, b: &str) -> bool {
        syntax::values_equal(value_syntax, a, b)
    }
}
