//! # fgctl
//!
//! Translation profile tooling for the federation gateway.

#![forbid(unsafe_code)]
#![deny(warnings)]

use clap::Parser;
use fg_cli::{
    cli::{Cli, Command},
    commands::{run_profiles, run_translate, Workspace},
    config::CliConfig,
    output::error,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(&cli.config)?;
    config.init_tracing(cli.verbose)?;
    tracing::debug!(config = %config.path.display(), "configuration loaded");

    let workspace = Workspace::load(&cli.profiles, config)?;

    let result = match cli.command {
        Command::Profiles(cmd) => run_profiles(cmd, &workspace, cli.output),
        Command::Translate(args) => run_translate(args, &workspace, cli.output),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
