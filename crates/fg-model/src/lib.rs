//! # fg-model
//!
//! Domain models for the identity federation gateway.
//!
//! Two families of types live here:
//!
//! - The **remote input model** ([`RemotelyAuthenticatedInput`] and its parts):
//!   a protocol-agnostic view of what a remote IdP asserted.
//! - The **local model** ([`Entity`], [`Identity`], [`Attribute`],
//!   [`GroupMembership`], ...): values exchanged with the local identity store.
//!
//! Local items created by a translation profile carry a provenance tag, the
//! (remote IdP, profile) pair, used to scope stale-item cleanup.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attribute;
pub mod entity;
pub mod group;
pub mod identity;
pub mod remote;
pub mod syntax;

pub use attribute::{Attribute, AttributeExt, AttributeKey};
pub use entity::{Entity, EntityInformation, EntityParam, EntityScheduledOperation, EntityState};
pub use group::{missing_groups, Group, GroupMembership, GroupPath, ROOT_GROUP};
pub use identity::{Identity, IdentityParam, IdentityTaV};
pub use remote::{
    RemoteAttribute, RemoteGroupMembership, RemoteIdentity, RemoteInputDocument,
    RemotelyAuthenticatedInput,
};
