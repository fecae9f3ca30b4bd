//! Mapping instructions produced by translation profiles.
//!
//! A [`MappingResult`] is the not-yet-applied description of how the local
//! store should change for one authentication attempt. Rules produce
//! fragments; the profile executor merges them; the engine applies the final
//! result exactly once.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fg_model::{Attribute, EntityScheduledOperation, IdentityParam};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TranslationError;

// ============================================================================
// Effect Modes
// ============================================================================

/// What to do with a mapped identity that is not in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityEffectMode {
    /// The identity must already exist, otherwise the attempt is denied.
    RequireMatch,
    /// Match if present, otherwise create it.
    CreateOrMatch,
    /// Match if present, otherwise ignore.
    Match,
    /// Add to an already matched entity, never create an entity alone.
    #[serde(alias = "UPDATE_OR_MATCH")]
    CreateOrUpdate,
}

/// How a mapped attribute is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeEffectMode {
    /// Write only when absent.
    CreateOnly,
    /// Write unless an equal value is already stored.
    #[default]
    CreateOrUpdate,
    /// Write only when already present.
    UpdateOnly,
}

/// What to do when a mapped group is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupEffectMode {
    /// Create the group and its missing ancestors.
    CreateGroupIfMissing,
    /// Deny the attempt.
    #[default]
    RequireExistingGroup,
    /// Skip the group.
    IgnoreIfMissing,
}

macro_rules! mode_strings {
    ($ty:ident { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            /// Returns the canonical name of the mode.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TranslationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name $(| $alias)* => Ok(Self::$variant),)+
                    other => Err(TranslationError::config(format!(
                        concat!("unknown ", stringify!($ty), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

mode_strings!(IdentityEffectMode {
    RequireMatch => "REQUIRE_MATCH",
    CreateOrMatch => "CREATE_OR_MATCH",
    Match => "MATCH",
    CreateOrUpdate => "CREATE_OR_UPDATE" | "UPDATE_OR_MATCH",
});

mode_strings!(AttributeEffectMode {
    CreateOnly => "CREATE_ONLY",
    CreateOrUpdate => "CREATE_OR_UPDATE",
    UpdateOnly => "UPDATE_ONLY",
});

mode_strings!(GroupEffectMode {
    CreateGroupIfMissing => "CREATE_GROUP_IF_MISSING",
    RequireExistingGroup => "REQUIRE_EXISTING_GROUP",
    IgnoreIfMissing => "IGNORE_IF_MISSING",
});

// ============================================================================
// Mapped Items
// ============================================================================

/// An identity produced by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedIdentity {
    /// Effect mode.
    pub mode: IdentityEffectMode,
    /// The identity, with provenance.
    pub identity: IdentityParam,
    /// Credential requirement used if this identity creates an entity.
    pub credential_requirement: Option<String>,
}

impl MappedIdentity {
    /// Creates a mapped identity.
    #[must_use]
    pub fn new(
        mode: IdentityEffectMode,
        identity: IdentityParam,
        credential_requirement: Option<String>,
    ) -> Self {
        Self {
            mode,
            identity,
            credential_requirement,
        }
    }
}

impl fmt::Display for MappedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identity, self.mode)
    }
}

/// An attribute produced by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedAttribute {
    /// Effect mode.
    pub mode: AttributeEffectMode,
    /// The attribute, with provenance.
    pub attribute: Attribute,
}

impl MappedAttribute {
    /// Creates a mapped attribute.
    #[must_use]
    pub const fn new(mode: AttributeEffectMode, attribute: Attribute) -> Self {
        Self { mode, attribute }
    }
}

/// A group membership produced by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedGroup {
    /// Group path.
    pub group: String,
    /// Effect mode.
    pub mode: GroupEffectMode,
    /// Remote IdP tag.
    pub idp: Option<String>,
    /// Translation profile tag.
    pub profile: Option<String>,
}

impl MappedGroup {
    /// Creates a mapped group.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        mode: GroupEffectMode,
        idp: Option<&str>,
        profile: Option<&str>,
    ) -> Self {
        Self {
            group: group.into(),
            mode,
            idp: idp.map(str::to_string),
            profile: profile.map(str::to_string),
        }
    }
}

/// A scheduled entity lifecycle change. No operation clears any pending one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChange {
    /// Operation to schedule.
    pub scheduled_operation: Option<EntityScheduledOperation>,
    /// When it takes effect.
    pub scheduled_time: Option<DateTime<Utc>>,
}

// ============================================================================
// Mapping Result
// ============================================================================

/// Accumulated output of a translation profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    /// Mapped identities, in rule order.
    pub identities: Vec<MappedIdentity>,
    /// Mapped attributes, in rule order.
    pub attributes: Vec<MappedAttribute>,
    /// Mapped groups, in rule order.
    pub groups: Vec<MappedGroup>,
    /// Entity lifecycle changes, in rule order.
    pub entity_changes: Vec<EntityChange>,
    /// Identity values the principal was authenticated with.
    pub authenticated_with: IndexSet<String>,
    /// Remove identities from this IdP and profile that were not mapped.
    pub clean_stale_identities: bool,
    /// Remove group memberships from this IdP and profile that were not mapped.
    pub clean_stale_groups: bool,
    /// Remove attributes from this IdP and profile that were not mapped.
    pub clean_stale_attributes: bool,
    /// Local entity the result was resolved to.
    pub mapped_at_existing_entity: Option<Uuid>,
}

impl MappingResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity.
    pub fn add_identity(&mut self, identity: MappedIdentity) {
        self.identities.push(identity);
    }

    /// Adds an attribute.
    pub fn add_attribute(&mut self, attribute: MappedAttribute) {
        self.attributes.push(attribute);
    }

    /// Adds a group.
    pub fn add_group(&mut self, group: MappedGroup) {
        self.groups.push(group);
    }

    /// Adds an entity change.
    pub fn add_entity_change(&mut self, change: EntityChange) {
        self.entity_changes.push(change);
    }

    /// Records an identity value the principal was authenticated with.
    pub fn add_authenticated_with(&mut self, value: impl Into<String>) {
        self.authenticated_with.insert(value.into());
    }

    /// Turns on all stale-data cleanup flags.
    pub fn clean_all_stale(&mut self) {
        self.clean_stale_identities = true;
        self.clean_stale_groups = true;
        self.clean_stale_attributes = true;
    }

    /// Turns off all stale-data cleanup flags.
    pub fn keep_all_stale(&mut self) {
        self.clean_stale_identities = false;
        self.clean_stale_groups = false;
        self.clean_stale_attributes = false;
    }

    /// Merges another result into this one.
    ///
    /// Lists are concatenated without deduplication and flags are OR-ed.
    pub fn merge(&mut self, other: Self) {
        self.identities.extend(other.identities);
        self.attributes.extend(other.attributes);
        self.groups.extend(other.groups);
        self.entity_changes.extend(other.entity_changes);
        self.authenticated_with.extend(other.authenticated_with);
        self.clean_stale_identities |= other.clean_stale_identities;
        self.clean_stale_groups |= other.clean_stale_groups;
        self.clean_stale_attributes |= other.clean_stale_attributes;
        if self.mapped_at_existing_entity.is_none() {
            self.mapped_at_existing_entity = other.mapped_at_existing_entity;
        }
    }

    /// Checks whether nothing was mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
            && self.attributes.is_empty()
            && self.groups.is_empty()
            && self.entity_changes.is_empty()
            && !self.clean_stale_identities
            && !self.clean_stale_groups
            && !self.clean_stale_attributes
    }

    /// Returns the attributes mapped in the given group.
    #[must_use]
    pub fn attributes_in_group(&self, group: &str) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.attribute.group_path == group)
            .map(|a| a.attribute.clone())
            .collect()
    }
}

impl fmt::Display for MappingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Identities:")?;
        for id in &self.identities {
            writeln!(f, "  {id}")?;
        }
        writeln!(f, "Attributes:")?;
        for a in &self.attributes {
            writeln!(
                f,
                "  {}@{}: {:?} ({})",
                a.attribute.name, a.attribute.group_path, a.attribute.values, a.mode
            )?;
        }
        writeln!(f, "Groups:")?;
        for g in &self.groups {
            writeln!(f, "  {} ({})", g.group, g.mode)?;
        }
        write!(
            f,
            "Stale cleanup: identities={} groups={} attributes={}",
            self.clean_stale_identities, self.clean_stale_groups, self.clean_stale_attributes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(value: &str) -> MappedIdentity {
        MappedIdentity::new(
            IdentityEffectMode::Match,
            IdentityParam::new("userName", value),
            None,
        )
    }

    #[test]
    fn merge_concatenates_and_ors_flags() {
        let mut a = MappingResult::new();
        a.add_identity(identity("joe"));
        a.clean_stale_groups = true;

        let mut b = MappingResult::new();
        b.add_identity(identity("joe"));
        b.clean_stale_attributes = true;

        a.merge(b);
        assert_eq!(a.identities.len(), 2);
        assert!(a.clean_stale_groups);
        assert!(a.clean_stale_attributes);
        assert!(!a.clean_stale_identities);
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(
            "UPDATE_OR_MATCH".parse::<IdentityEffectMode>().unwrap(),
            IdentityEffectMode::CreateOrUpdate
        );
        assert_eq!(
            "CREATE_GROUP_IF_MISSING".parse::<GroupEffectMode>().unwrap(),
            GroupEffectMode::CreateGroupIfMissing
        );
        assert!("SOMETIMES".parse::<AttributeEffectMode>().is_err());
        assert_eq!(AttributeEffectMode::UpdateOnly.to_string(), "UPDATE_ONLY");
    }

    #[test]
    fn attributes_filtered_by_group() {
        let mut r = MappingResult::new();
        r.add_attribute(MappedAttribute::new(
            AttributeEffectMode::CreateOnly,
            Attribute::string("cn", "Joe"),
        ));
        r.add_attribute(MappedAttribute::new(
            AttributeEffectMode::CreateOnly,
            Attribute::string("o", "ICM").in_group("/A"),
        ));

        assert_eq!(r.attributes_in_group("/").len(), 1);
        assert_eq!(r.attributes_in_group("/A")[0].name, "o");
        assert!(r.attributes_in_group("/B").is_empty());
    }
}
