//! Entity and identity storage provider traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fg_model::{
    Attribute, Entity, EntityScheduledOperation, EntityState, Identity, IdentityParam, IdentityTaV,
};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for entity and identity storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// Gets the entity owning the given identity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if no entity has this identity.
    async fn get_entity_by_identity(&self, identity: &IdentityTaV) -> StorageResult<Entity>;

    /// Gets an entity by ID.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the entity doesn't exist.
    async fn get_entity(&self, id: Uuid) -> StorageResult<Entity>;

    /// Creates a new entity with its first identity.
    ///
    /// The entity becomes a member of the root group, and `attributes` are
    /// assigned in the root group.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the identity is already taken.
    async fn add_entity(
        &self,
        identity: &IdentityParam,
        credential_requirement: Option<&str>,
        state: EntityState,
        attributes: &[Attribute],
    ) -> StorageResult<Identity>;

    /// Adds an identity to an existing entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the identity is already taken, or
    /// `StorageError::NotFound` if the entity doesn't exist.
    async fn add_identity(&self, identity: &IdentityParam, entity: Uuid) -> StorageResult<Identity>;

    /// Removes an identity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the identity doesn't exist.
    async fn remove_identity(&self, identity: &IdentityTaV) -> StorageResult<()>;
}

/// Schedules entity lifecycle changes.
#[async_trait]
pub trait EntityScheduler: Send + Sync {
    /// Schedules an operation on an entity, or clears the pending one when
    /// `operation` is `None`.
    async fn schedule_entity_change(
        &self,
        entity: Uuid,
        time: Option<DateTime<Utc>>,
        operation: Option<EntityScheduledOperation>,
    ) -> StorageResult<()>;
}

/// Resolves identities to entities for authentication.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves an identity to the ID of its entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the identity is unknown.
    async fn resolve_identity(&self, identity: &IdentityTaV) -> StorageResult<Uuid>;

    /// Checks whether an entity may authenticate.
    async fn is_entity_enabled(&self, entity: Uuid) -> StorageResult<bool>;
}
