//! Remote principal and authentication outcome types.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use fg_core::Event;
use fg_model::{Attribute, EntityParam, IdentityTaV, RemotelyAuthenticatedInput};
use fg_translation::{MappingResult, PolicyViolation};
use serde::Serialize;
use uuid::Uuid;

/// A remote principal after translation.
#[derive(Debug, Clone)]
pub struct RemotelyAuthenticatedPrincipal {
    /// Remote IdP name.
    pub remote_idp: String,
    /// Translation profile that was applied.
    pub profile: String,
    /// Mapped identities, in mapping order.
    pub identities: Vec<IdentityTaV>,
    /// Mapped attributes.
    pub attributes: Vec<Attribute>,
    /// Mapped group paths.
    pub groups: BTreeSet<String>,
    /// Local principal the input was mapped to, if any.
    pub local_mapped_principal: Option<EntityParam>,
    /// The full mapping result.
    pub mapping_result: MappingResult,
    /// The remote input.
    pub input: RemotelyAuthenticatedInput,
    /// Audit events of the translation.
    pub events: Vec<Event>,
    /// When the principal was assembled.
    pub creation_time: DateTime<Utc>,
}

impl RemotelyAuthenticatedPrincipal {
    /// Assembles a principal from a mapping result.
    #[must_use]
    pub fn new(
        input: RemotelyAuthenticatedInput,
        profile: impl Into<String>,
        mapping_result: MappingResult,
    ) -> Self {
        let mut principal = Self {
            remote_idp: input.idp_name().to_string(),
            profile: profile.into(),
            identities: mapping_result
                .identities
                .iter()
                .map(|mi| mi.identity.tav())
                .collect(),
            attributes: mapping_result
                .attributes
                .iter()
                .map(|ma| ma.attribute.clone())
                .collect(),
            groups: mapping_result
                .groups
                .iter()
                .map(|mg| mg.group.clone())
                .collect(),
            local_mapped_principal: None,
            mapping_result,
            input,
            events: Vec::new(),
            creation_time: Utc::now(),
        };
        principal.local_mapped_principal = principal.local_principal();
        principal
    }

    /// Returns the primary identity: the first mapped identity the local
    /// entity was authenticated with, or the first mapped one.
    #[must_use]
    pub fn primary_identity(&self) -> Option<&IdentityTaV> {
        self.authenticated_identity().or_else(|| self.identities.first())
    }

    fn authenticated_identity(&self) -> Option<&IdentityTaV> {
        self.identities
            .iter()
            .find(|tav| self.mapping_result.authenticated_with.contains(&tav.value))
    }

    /// The local principal is addressed by its primary identity, resolved
    /// later through the identity resolver. Falls back to the entity id
    /// when no mapped identity was authenticated.
    fn local_principal(&self) -> Option<EntityParam> {
        let entity = self.mapping_result.mapped_at_existing_entity?;
        Some(
            self.authenticated_identity()
                .cloned()
                .map_or(EntityParam::Id(entity), EntityParam::Identity),
        )
    }
}

/// A local entity authenticated through a remote IdP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedEntity {
    /// Local entity id.
    pub entity_id: Uuid,
    /// Identity values the principal was authenticated with.
    pub authenticated_with: Vec<String>,
    /// Remote IdP name.
    pub remote_idp: Option<String>,
}

/// Why a remote authentication was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// A translation profile policy stopped the attempt.
    PolicyViolation(PolicyViolation),
    /// The local account is disabled.
    DisabledAccount,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyViolation(v) => write!(f, "policy violation: {v}"),
            Self::DisabledAccount => {
                write!(f, "the remotely authenticated principal was mapped to a disabled account")
            }
        }
    }
}

/// Outcome of translating a remote authentication.
#[derive(Debug, Clone)]
pub enum RemoteAuthenticationResult {
    /// Mapped to an enabled local entity.
    Successful {
        /// The translated principal.
        principal: Box<RemotelyAuthenticatedPrincipal>,
        /// The local entity.
        entity: AuthenticatedEntity,
    },
    /// Dry run: the profile ran but nothing was written.
    SuccessfulPartial {
        /// The translated principal.
        principal: Box<RemotelyAuthenticatedPrincipal>,
        /// The existing local entity, when one could be resolved.
        entity: Option<AuthenticatedEntity>,
    },
    /// No local counterpart; the caller may offer registration or association.
    UnknownRemotePrincipal {
        /// The translated principal.
        principal: Box<RemotelyAuthenticatedPrincipal>,
        /// Registration form to offer.
        registration_form: Option<String>,
        /// Whether associating with an existing account may be offered.
        allow_association: bool,
    },
    /// The attempt was denied.
    Denied {
        /// Why.
        reason: DenyReason,
    },
}

impl RemoteAuthenticationResult {
    /// Checks whether the principal was mapped to a local entity.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self, Self::Successful { .. })
    }

    /// Checks whether the principal has no local counterpart.
    #[must_use]
    pub const fn is_unknown_principal(&self) -> bool {
        matches!(self, Self::UnknownRemotePrincipal { .. })
    }

    /// Checks whether the attempt was denied.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Returns the authenticated entity, if any.
    #[must_use]
    pub const fn entity(&self) -> Option<&AuthenticatedEntity> {
        match self {
            Self::Successful { entity, .. } => Some(entity),
            Self::SuccessfulPartial { entity, .. } => entity.as_ref(),
            Self::UnknownRemotePrincipal { .. } | Self::Denied { .. } => None,
        }
    }

    /// Returns the translated principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&RemotelyAuthenticatedPrincipal> {
        match self {
            Self::Successful { principal, .. }
            | Self::SuccessfulPartial { principal, .. }
            | Self::UnknownRemotePrincipal { principal, .. } => Some(principal),
            Self::Denied { .. } => None,
        }
    }
}
