//! Configuration management for ReviewBot.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section is optional in the file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for ReviewBot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Review dataset settings
    pub dataset: DatasetConfig,

    /// Retry and backoff policy for classification calls
    pub retry: RetryConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Dashboard display settings
    pub display: DisplayConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.reviewbot.reviewbot/config.toml
    /// - Linux: ~/.config/reviewbot/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\reviewbot\config\config.toml
    ///
    /// Falls back to ~/.reviewbot/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "reviewbot", "reviewbot")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".reviewbot").join("config.toml")
            })
    }

    /// Get the resolved dataset path (with ~ expansion).
    pub fn dataset_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.dataset.path);
        PathBuf::from(expanded.into_owned())
    }

    /// Display locale for labels and prompts.
    pub fn locale(&self) -> Locale {
        self.display.locale
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
