//! # fg-storage
//!
//! Local identity store interfaces for the federation gateway.
//!
//! The translation engine never talks to a database directly; it issues
//! calls through the provider traits defined here. Backends implement them
//! and own transaction boundaries.
//!
//! ## Provider Traits
//!
//! - [`EntityProvider`] - entity lookup and identity mutation
//! - [`GroupProvider`] - groups and memberships
//! - [`AttributeProvider`] - attribute assignment
//! - [`EntityScheduler`] - scheduled entity lifecycle changes
//! - [`IdentityResolver`] - identity to entity resolution for authentication
//!
//! With the `memory` feature, [`memory::InMemoryStore`]
//! implements all of them.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attribute;
pub mod entity;
pub mod error;
pub mod group;
#[cfg(feature = "memory")]
pub mod memory;

pub use attribute::AttributeProvider;
pub use entity::{EntityProvider, EntityScheduler, IdentityResolver};
pub use error::{StorageError, StorageResult};
pub use group::GroupProvider;
#[cfg(feature = "memory")]
pub use memory::InMemoryStore;
