//! Identity value types.
//!
//! An identity is a typed value (e.g. `userName:joe`, `email:joe@example.com`)
//! by which a local entity can be found. One entity may have many equivalent
//! identities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity type and value, the lookup key of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityTaV {
    /// Identity type (e.g., "userName", "email", "identifier").
    pub type_id: String,
    /// Identity value.
    pub value: String,
}

impl IdentityTaV {
    /// Creates a new identity type and value.
    #[must_use]
    pub fn new(type_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for IdentityTaV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.type_id, self.value)
    }
}

/// An identity about to be stored, with optional provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityParam {
    /// Identity type.
    pub type_id: String,
    /// Identity value.
    pub value: String,
    /// Remote IdP which asserted this identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_idp: Option<String>,
    /// Translation profile which produced this identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_profile: Option<String>,
}

impl IdentityParam {
    /// Creates an identity without provenance.
    #[must_use]
    pub fn new(type_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
            remote_idp: None,
            translation_profile: None,
        }
    }

    /// Creates an identity tagged with the remote IdP and profile that produced it.
    #[must_use]
    pub fn with_provenance(
        type_id: impl Into<String>,
        value: impl Into<String>,
        remote_idp: impl Into<String>,
        translation_profile: impl Into<String>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
            remote_idp: Some(remote_idp.into()),
            translation_profile: Some(translation_profile.into()),
        }
    }

    /// Returns the lookup key of this identity.
    #[must_use]
    pub fn tav(&self) -> IdentityTaV {
        IdentityTaV::new(self.type_id.clone(), self.value.clone())
    }
}

impl fmt::Display for IdentityParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.type_id, self.value)
    }
}

/// A stored identity, attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Entity owning this identity.
    pub entity_id: Uuid,
    /// Identity type.
    pub type_id: String,
    /// Identity value.
    pub value: String,
    /// Remote IdP which asserted this identity, if created by a profile.
    pub remote_idp: Option<String>,
    /// Translation profile which created this identity.
    pub translation_profile: Option<String>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a stored identity from its parameters.
    #[must_use]
    pub fn from_param(entity_id: Uuid, param: &IdentityParam) -> Self {
        let now = Utc::now();
        Self {
            entity_id,
            type_id: param.type_id.clone(),
            value: param.value.clone(),
            remote_idp: param.remote_idp.clone(),
            translation_profile: param.translation_profile.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the lookup key of this identity.
    #[must_use]
    pub fn tav(&self) -> IdentityTaV {
        IdentityTaV::new(self.type_id.clone(), self.value.clone())
    }

    /// Checks whether this identity has the same type and value as `param`.
    #[must_use]
    pub fn matches(&self, param: &IdentityParam) -> bool {
        self.type_id == param.type_id && self.value == param.value
    }
}
