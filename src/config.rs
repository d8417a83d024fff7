//! Layered configuration for the harness.
//!
//! Sources, later ones winning:
//! - Default values
//! - `.livetest/settings.toml`, found by walking up from the current directory
//! - Environment variables
//! - CLI argument overrides (applied by the command)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LIVETEST_` and use double
//! underscores to separate nested levels:
//! - `LIVETEST_SERVER__MAX_BATCH_SIZE=64` sets `server.max_batch_size`
//! - `LIVETEST_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::framing::reader::{
    DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_HEADER_LINE,
};
use crate::server::dispatcher::DEFAULT_MAX_IN_FLIGHT;

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".livetest";
pub const CONFIG_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "LIVETEST_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Log levels: a default plus per-module overrides.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Target name to level, e.g. `livetest::server = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Operation manifest introspected from the module under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<PathBuf>,

    /// Operation manifest declared by the service specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_path: Option<PathBuf>,

    /// Most messages accepted in one batch frame.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Longest accepted header line in bytes.
    #[serde(default = "default_max_header_line")]
    pub max_header_line: usize,

    /// Largest accepted payload in bytes.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Requests handled concurrently before the reader waits.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Write null-valued properties in responses.
    #[serde(default)]
    pub include_nulls: bool,
}

fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}
fn default_max_header_line() -> usize {
    DEFAULT_MAX_HEADER_LINE
}
fn default_max_content_length() -> usize {
    DEFAULT_MAX_CONTENT_LENGTH
}
fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            module_path: None,
            specification_path: None,
            max_batch_size: default_max_batch_size(),
            max_header_line: default_max_header_line(),
            max_content_length: default_max_content_length(),
            max_in_flight: default_max_in_flight(),
            include_nulls: false,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring defaults and
    /// environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels; single underscores
            // stay within field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.livetest/settings.toml` from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Write a default settings file under `root`
    pub fn init_config_file(
        root: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
