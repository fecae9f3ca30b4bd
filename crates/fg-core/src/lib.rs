//! # fg-core
//!
//! Core utilities, configuration, and error handling for the identity
//! federation gateway.
//!
//! This crate provides foundational types shared by the translation engine,
//! the verification orchestrator, and the command-line tooling.
//!
//! ## Modules
//!
//! - [`config`] - TOML-backed configuration with defaults for every field
//! - [`error`] - Core error type
//! - [`event`] - Audit events emitted while reconciling remote identities

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{Config, LoggingConfig, TranslationConfig};
pub use error::{Error, Result};
pub use event::{Event, EventBuilder, EventOutcome, EventType};
