//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{OutputFormat, DEFAULT_CONFIG_FILE};

/// fgctl - translation profile tooling for the federation gateway.
#[derive(Debug, Parser)]
#[command(name = "fgctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, env = "FG_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Profile definition files or directories of `*.json` files.
    #[arg(short, long = "profiles", env = "FG_PROFILES", value_delimiter = ',', required = true)]
    pub profiles: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translation profile commands.
    #[command(subcommand)]
    Profiles(ProfilesCommand),

    /// Run a profile against a remote input without touching any store.
    Translate(TranslateArgs),
}

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List loaded profiles.
    List,

    /// Compile every profile and its inclusions.
    Validate,

    /// Print a profile definition.
    Show {
        /// Profile name.
        name: String,
    },
}

/// Arguments of the translate command.
#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// Profile to run.
    #[arg(long)]
    pub profile: String,

    /// JSON file with the remote input.
    #[arg(long)]
    pub input: PathBuf,
}
