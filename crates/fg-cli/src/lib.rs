//! # fg-cli
//!
//! Command-line tooling for federation gateway translation profiles.
//!
//! - List and inspect profile definitions loaded from JSON files
//! - Validate profiles, following every inclusion
//! - Dry-run a profile against a remote input document

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
