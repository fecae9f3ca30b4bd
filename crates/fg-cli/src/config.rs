//! CLI configuration.

use std::path::{Path, PathBuf};

use fg_core::Config;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fgctl.toml";

/// CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Gateway configuration shared with the server.
    pub gateway: Config,
}

impl CliConfig {
    /// Loads configuration from file. A missing file yields defaults.
    pub fn load(path: &Path) -> crate::CliResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            gateway: Config::load(path)?,
        })
    }

    /// Initializes logging to stderr.
    ///
    /// `RUST_LOG` wins over the configured level; `verbose` forces `debug`.
    pub fn init_tracing(&self, verbose: bool) -> crate::CliResult<()> {
        let filter = if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&self.gateway.logging.level))
                .map_err(|e| crate::CliError::Config(format!("invalid log level: {e}")))?
        };

        let json = self.gateway.logging.json;
        tracing_subscriber::registry()
            .with(filter)
            .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
            .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
            .try_init()
            .map_err(|e| crate::CliError::Config(format!("failed to initialize logging: {e}")))
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = CliConfig::load(Path::new("/nonexistent/fgctl.toml")).unwrap();
        assert_eq!(config.gateway, Config::default());
    }

    #[test]
    fn reads_gateway_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[translation]\nmax_include_depth = 3").unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.gateway.translation.max_include_depth, 3);
        assert_eq!(config.path, file.path());
    }
}
