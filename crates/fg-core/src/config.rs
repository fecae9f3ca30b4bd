//! Configuration management for the federation gateway.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a usable configuration.
//!
//! ```toml
//! [translation]
//! max_include_depth = 8
//!
//! [logging]
//! level = "debug"
//! json = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation profile execution settings.
    pub translation: TranslationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Translation profile execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Maximum nesting of included profiles, counting the top-level profile.
    pub max_include_depth: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_include_depth: 16,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON formatted log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.translation.max_include_depth == 0 {
            return Err(Error::Validation(
                "translation.max_include_depth must be at least 1".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::Validation("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.translation.max_include_depth, 16);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [translation]
            max_include_depth = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.translation.max_include_depth, 4);
        assert!(!config.logging.json);
    }

    #[test]
    fn zero_include_depth_is_rejected() {
        let err = Config::from_toml_str("[translation]\nmax_include_depth = 0").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = Config::from_toml_str("[translation").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_reads_file_or_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\njson = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        let missing = Config::load("/nonexistent/fg.toml").unwrap();
        assert_eq!(missing, Config::default());
    }
}
