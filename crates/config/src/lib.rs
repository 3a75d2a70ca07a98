#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for flowtidy
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`--config PATH`, else ~/.config/flowtidy/config.toml)
//! - Environment variables (`FLOWTIDY_*`)
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod sections;

pub use sections::{
    CategoryRule, DedupeConfig, GeneralConfig, ImportConfig, PathConfig, RepairConfig, SiteConfig,
};

use flowtidy_errors::{ConfigError, Error};
use flowtidy_types::{ColorChoice, HealthPolicy, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub dedupe: DedupeConfig,

    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        match Self::default_path() {
            Ok(config_path) if config_path.exists() => Self::load_from_file(&config_path).await,
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with `FLOWTIDY_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides produced by `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(output) = lookup("FLOWTIDY_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("FLOWTIDY_OUTPUT", output)),
            };
        }

        if let Some(color) = lookup("FLOWTIDY_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("FLOWTIDY_COLOR", color)),
            };
        }

        if let Some(dir) = lookup("FLOWTIDY_WORKFLOWS_DIR") {
            self.paths.workflows_dir = Some(PathBuf::from(dir));
        }

        if let Some(root) = lookup("FLOWTIDY_SITE_ROOT") {
            self.paths.site_root = Some(PathBuf::from(root));
        }

        if let Some(url) = lookup("FLOWTIDY_HEALTH_URL") {
            self.import.health_url = url;
        }

        if let Some(policy) = lookup("FLOWTIDY_HEALTH_POLICY") {
            self.import.health_policy = match policy.as_str() {
                "assume-available" => HealthPolicy::AssumeAvailable,
                "require" => HealthPolicy::Require,
                _ => return Err(invalid("FLOWTIDY_HEALTH_POLICY", policy)),
            };
        }

        if let Some(timeout) = lookup("FLOWTIDY_IMPORT_TIMEOUT") {
            self.import.timeout_secs = parse_number("FLOWTIDY_IMPORT_TIMEOUT", &timeout)?;
        }

        Ok(())
    }

    /// Check values serde cannot reject on its own
    ///
    /// # Errors
    ///
    /// Returns an error for an empty engine command line.
    pub fn validate(&self) -> Result<(), Error> {
        if self.import.command.is_empty() {
            return Err(ConfigError::MissingField {
                field: "import.command".to_string(),
            }
            .into());
        }
        if self.import.version_command.is_empty() {
            return Err(ConfigError::MissingField {
                field: "import.version_command".to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn workflows_dir(&self) -> PathBuf {
        path_or(self.paths.workflows_dir.as_ref(), constants::WORKFLOWS_DIR)
    }

    #[must_use]
    pub fn category_index_path(&self) -> PathBuf {
        path_or(self.paths.category_index.as_ref(), constants::CATEGORY_INDEX)
    }

    #[must_use]
    pub fn import_log_path(&self) -> PathBuf {
        path_or(self.paths.import_log.as_ref(), constants::IMPORT_LOG)
    }

    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        path_or(self.paths.backup_root.as_ref(), constants::BACKUP_ROOT)
    }

    #[must_use]
    pub fn site_root(&self) -> PathBuf {
        path_or(self.paths.site_root.as_ref(), constants::SITE_ROOT)
    }

    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        path_or(self.paths.log_dir.as_ref(), constants::LOG_DIR)
    }
}

fn path_or(configured: Option<&PathBuf>, fallback: &str) -> PathBuf {
    configured
        .cloned()
        .unwrap_or_else(|| PathBuf::from(fallback))
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| invalid(field, value.to_string()))
}
