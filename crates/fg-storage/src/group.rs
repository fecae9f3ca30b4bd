//! Group storage provider trait.

use std::collections::HashMap;

use async_trait::async_trait;
use fg_model::{Attribute, GroupMembership};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for group and membership storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait GroupProvider: Send + Sync {
    /// Gets all memberships of an entity keyed by group path, including `/`.
    async fn get_groups(&self, entity: Uuid) -> StorageResult<HashMap<String, GroupMembership>>;

    /// Checks whether a group exists.
    async fn group_exists(&self, path: &str) -> StorageResult<bool>;

    /// Creates a group.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the group exists, or
    /// `StorageError::InvalidData` if its parent doesn't.
    async fn create_group(&self, path: &str) -> StorageResult<()>;

    /// Adds an entity to a group, assigning `attributes` in that group.
    ///
    /// The membership is tagged with the remote IdP and profile.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the group doesn't exist.
    async fn add_member(
        &self,
        path: &str,
        entity: Uuid,
        attributes: &[Attribute],
        remote_idp: Option<&str>,
        translation_profile: Option<&str>,
    ) -> StorageResult<()>;

    /// Removes an entity from a group.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the entity isn't a member.
    async fn remove_member(&self, path: &str, entity: Uuid) -> StorageResult<()>;
}
