//! # fg-translation
//!
//! Translation of remotely authenticated principals into local identities.
//!
//! A login from a remote IdP arrives as a [`RemotelyAuthenticatedInput`]
//! (re-exported from `fg-model`). An [`InputTranslationProfile`] runs its
//! rules against it and produces a [`MappingResult`]: the identities,
//! attributes, group memberships and lifecycle changes the local store
//! should reflect. The [`InputTranslationEngine`] then applies that result.
//!
//! ```text
//! RemotelyAuthenticatedInput
//!          │
//!          ▼
//! InputTranslationProfile ──includes──▶ ProfileRepository
//!   rule: condition + action (ActionRegistry)
//!          │
//!          ▼
//!     MappingResult
//!          │
//!          ▼
//! InputTranslationEngine ──▶ EntityProvider / GroupProvider / AttributeProvider
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fg_translation::{ActionRegistry, InMemoryProfileRepository, InputTranslationProfile, TranslationProfile};
//!
//! let profile = TranslationProfile::new("ldap")
//!     .with_rule("true", "mapIdentity", &["userName", "id", "", "CREATE_OR_MATCH"])
//!     .with_rule("attr['ou'] == 'staff'", "mapGroup", &["'/staff'", "CREATE_GROUP_IF_MISSING"]);
//!
//! let profile = InputTranslationProfile::new(
//!     &profile,
//!     InMemoryProfileRepository::new().into_shared(),
//!     Arc::new(ActionRegistry::with_builtin_actions()),
//! )?;
//! let mut result = profile.translate(&input)?;
//! let report = engine.process(&mut result).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod action;
pub mod condition;
pub mod context;
pub mod engine;
pub mod error;
pub mod expression;
pub mod mapping;
pub mod profile;
pub mod repository;
pub mod rule;

pub use action::{
    ActionContext, ActionOutcome, ActionParameter, ActionParameterType, ActionRegistry,
    InputAction, InputActionFactory,
};
pub use condition::TranslationCondition;
pub use context::TranslationContext;
pub use engine::{InputTranslationEngine, Reconciliation};
pub use error::{PolicyViolation, TranslationError, TranslationResult};
pub use expression::Expression;
pub use fg_model::RemotelyAuthenticatedInput;
pub use mapping::{
    AttributeEffectMode, EntityChange, GroupEffectMode, IdentityEffectMode, MappedAttribute,
    MappedGroup, MappedIdentity, MappingResult,
};
pub use profile::{InputTranslationProfile, ProfileMode, TranslationProfile};
pub use repository::{InMemoryProfileRepository, ProfileRepository};
pub use rule::{RuleEffect, TranslationRule};
