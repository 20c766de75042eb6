//! Configuration loading and validation for livetrack.
//!
//! Loads configuration from `~/.livetrack/config.toml` with environment
//! variable overrides. A missing file means defaults.

use livetrack_core::host::DEFAULT_LIVE_EDITOR_PARAM;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Activation configuration for the tracking facade.
///
/// Maps directly to `~/.livetrack/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Enable diagnostic output
    #[serde(default)]
    pub debug: bool,

    /// Skip environment detection and always activate
    #[serde(default)]
    pub force_live_mode: bool,

    /// Query parameter that marks the live editor frame
    #[serde(default = "default_live_editor_param")]
    pub live_editor_param: String,

    /// Eviction threshold for the tracking store (0 disables eviction)
    #[serde(default = "default_max_memory_map_size")]
    pub max_memory_map_size: usize,

    /// Live editor script loading
    #[serde(default)]
    pub loader: LoaderConfig,
}

fn default_live_editor_param() -> String {
    DEFAULT_LIVE_EDITOR_PARAM.into()
}
fn default_max_memory_map_size() -> usize {
    10_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    3000
}

impl LoaderConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debug: false,
            force_live_mode: false,
            live_editor_param: default_live_editor_param(),
            max_memory_map_size: default_max_memory_map_size(),
            loader: LoaderConfig::default(),
        }
    }
}

impl LiveConfig {
    /// Load configuration from the default path (~/.livetrack/config.toml).
    ///
    /// Environment variables override the file:
    /// - `LIVETRACK_DEBUG`
    /// - `LIVETRACK_FORCE_LIVE_MODE`
    /// - `LIVETRACK_PARAM`
    /// - `LIVETRACK_MAX_ENTRIES`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LIVETRACK_DEBUG") {
            self.debug = parse_flag("LIVETRACK_DEBUG", &value)?;
        }
        if let Some(value) = lookup("LIVETRACK_FORCE_LIVE_MODE") {
            self.force_live_mode = parse_flag("LIVETRACK_FORCE_LIVE_MODE", &value)?;
        }
        if let Some(param) = lookup("LIVETRACK_PARAM") {
            self.live_editor_param = param;
        }
        if let Some(value) = lookup("LIVETRACK_MAX_ENTRIES") {
            self.max_memory_map_size =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: "LIVETRACK_MAX_ENTRIES".into(),
                        value,
                    })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".livetrack")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.live_editor_param.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "live_editor_param must not be empty".into(),
            ));
        }

        if self.loader.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "loader.max_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.into(),
            value: value.into(),
        }),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
