//! Audit events for remote identity reconciliation.
//!
//! Every mutation the translation engine issues against the local identity
//! store is described by an [`Event`]. Events carry the provenance of the
//! change (remote IdP and translation profile) so that an operator can trace
//! which login caused which local state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Entity events
    /// A new local entity was created for a remote principal.
    EntityCreated,
    /// A scheduled entity state change was set or cleared.
    EntityChangeScheduled,

    // Identity events
    /// An equivalent identity was added to an entity.
    IdentityAdded,
    /// A stale identity was removed from an entity.
    IdentityRemoved,

    // Group events
    /// A missing group was created.
    GroupCreated,
    /// The entity was added to a group.
    MembershipAdded,
    /// A stale group membership was removed.
    MembershipRemoved,

    // Attribute events
    /// An attribute was created.
    AttributeCreated,
    /// An attribute was overwritten.
    AttributeUpdated,
    /// A stale attribute was removed.
    AttributeRemoved,

    // Outcome events
    /// The remote principal was resolved to a local entity.
    PrincipalResolved,
    /// The remote principal has no local counterpart.
    PrincipalUnknown,
    /// The translation was denied by a profile policy.
    TranslationDenied,
}

impl EventType {
    /// Returns whether this event type records a local store mutation.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::PrincipalResolved | Self::PrincipalUnknown | Self::TranslationDenied
        )
    }
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Local entity the event concerns.
    pub entity_id: Option<Uuid>,

    /// Remote IdP that asserted the data.
    pub remote_idp: Option<String>,

    /// Translation profile that produced the change.
    pub profile: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Returns the value of a detail by key.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for creating events.
#[derive(Debug)]
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    entity_id: Option<Uuid>,
    remote_idp: Option<String>,
    profile: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            entity_id: None,
            remote_idp: None,
            profile: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the entity ID.
    #[must_use]
    pub const fn entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Sets the provenance of the change.
    #[must_use]
    pub fn provenance(mut self, remote_idp: Option<&str>, profile: Option<&str>) -> Self {
        self.remote_idp = remote_idp.map(str::to_string);
        self.profile = profile.map(str::to_string);
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            entity_id: self.entity_id,
            remote_idp: self.remote_idp,
            profile: self.profile,
            error: self.error,
            details: self.details,
        }
    }
}
