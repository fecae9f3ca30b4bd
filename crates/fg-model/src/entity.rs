//! Entity domain model.
//!
//! An entity is the local principal. It owns one or more identities and has a
//! lifecycle state that can be changed on a schedule.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Identity, IdentityTaV};

/// Entity lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityState {
    /// Entity can authenticate.
    #[default]
    Valid,
    /// Entity is disabled.
    Disabled,
    /// Entity exists but may not authenticate.
    AuthenticationDisabled,
}

impl EntityState {
    /// Returns whether an entity in this state may authenticate.
    #[must_use]
    pub const fn can_authenticate(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Operation scheduled to happen to an entity at a later time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityScheduledOperation {
    /// Disable the entity.
    Disable,
    /// Remove the entity.
    Remove,
}

impl fmt::Display for EntityScheduledOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable => write!(f, "DISABLE"),
            Self::Remove => write!(f, "REMOVE"),
        }
    }
}

impl std::str::FromStr for EntityScheduledOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISABLE" => Ok(Self::Disable),
            "REMOVE" => Ok(Self::Remove),
            other => Err(format!("unknown scheduled operation '{other}'")),
        }
    }
}

/// Lifecycle information of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInformation {
    /// Current state.
    pub state: EntityState,
    /// Pending scheduled operation.
    pub scheduled_operation: Option<EntityScheduledOperation>,
    /// When the scheduled operation takes effect.
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// A local entity with its identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier.
    pub id: Uuid,
    /// All identities of the entity.
    pub identities: Vec<Identity>,
    /// Lifecycle information.
    pub information: EntityInformation,
    /// Credential requirement set assigned at creation.
    pub credential_requirement: Option<String>,
}

impl Entity {
    /// Checks whether the entity owns the given identity.
    #[must_use]
    pub fn has_identity(&self, tav: &IdentityTaV) -> bool {
        self.identities
            .iter()
            .any(|i| i.type_id == tav.type_id && i.value == tav.value)
    }
}

/// Reference to an entity, either by ID or by one of its identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityParam {
    /// Entity referenced by ID.
    Id(Uuid),
    /// Entity referenced by an identity.
    Identity(IdentityTaV),
}

impl From<Uuid> for EntityParam {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<IdentityTaV> for EntityParam {
    fn from(tav: IdentityTaV) -> Self {
        Self::Identity(tav)
    }
}

impl fmt::Display for EntityParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "entity {id}"),
            Self::Identity(tav) => write!(f, "entity with identity {tav}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_state_authenticates() {
        assert!(EntityState::Valid.can_authenticate());
        assert!(!EntityState::Disabled.can_authenticate());
        assert!(!EntityState::AuthenticationDisabled.can_authenticate());
    }

    #[test]
    fn scheduled_operation_parses() {
        assert_eq!(
            "REMOVE".parse::<EntityScheduledOperation>(),
            Ok(EntityScheduledOperation::Remove)
        );
        assert!("DELETE".parse::<EntityScheduledOperation>().is_err());
        assert_eq!(EntityScheduledOperation::Disable.to_string(), "DISABLE");
    }
}
