//! # Configuration
//!
//! The process configuration is a single JSON file:
//!
//! - `app`: listener, contact, provider list, schedules, logging
//! - `datasets`: one entry per provider (SQLite path, import commands)
//! - `keys`: the API key registry with limits and starting counters
//!
//! Every field except the provider list and its datasets has a default.

pub mod errors;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::admission::ApiKeyRecord;
use crate::observability::LogFormat;
use crate::refresh::Schedule;

pub use errors::{ConfigError, ConfigResult};

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,

    /// Dataset settings by provider name
    #[serde(default)]
    pub datasets: HashMap<String, DatasetConfig>,

    /// API keys by key string
    #[serde(default)]
    pub keys: HashMap<String, ApiKeyRecord>,
}

/// Process-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Operator contact shown on the landing and discovery pages
    #[serde(default)]
    pub contact: String,

    /// Provider names, in refresh order
    pub providers: Vec<String>,

    /// Initial value of the mode flag
    #[serde(default = "default_true")]
    pub open: bool,

    /// `false` disables logging entirely
    #[serde(default = "default_true")]
    pub verbose: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Cron expression of the full reimport
    #[serde(default = "default_import_schedule")]
    pub import_schedule: String,

    /// Cron expression of the real-time update
    #[serde(default = "default_update_schedule")]
    pub update_schedule: String,

    /// Providers refreshed at the same time (1 = sequential)
    #[serde(default = "default_refresh_concurrency")]
    pub refresh_concurrency: usize,
}

/// Dataset settings of one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// SQLite file served for this provider
    pub sqlite_path: PathBuf,

    /// argv of the full import command; empty = only re-open the file
    #[serde(default)]
    pub import_command: Vec<String>,

    /// argv of the real-time update command; empty = no-op
    #[serde(default)]
    pub update_command: Vec<String>,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Seconds an import or update command may run before it is killed
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl DatasetConfig {
    /// Dataset at `path` with no import commands
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            sqlite_path: path.into(),
            import_command: Vec::new(),
            update_command: Vec::new(),
            busy_timeout_ms: default_busy_timeout_ms(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

/// A provider name paired with its dataset settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub dataset: DatasetConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_import_schedule() -> String {
    // 03:00 every night
    "0 0 3 * * *".to_string()
}

fn default_update_schedule() -> String {
    "0 */5 * * * *".to_string()
}

fn default_refresh_concurrency() -> usize {
    1
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_command_timeout_secs() -> u64 {
    30 * 60
}

impl AppConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AppConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.app.providers.is_empty() {
            return Err(ConfigError::Invalid("app.providers must not be empty".into()));
        }

        let mut seen = Vec::with_capacity(self.app.providers.len());
        for provider in &self.app.providers {
            let url_safe = !provider.is_empty()
                && provider
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !url_safe {
                return Err(ConfigError::Invalid(format!(
                    "Provider name '{}' must be non-empty and contain only [A-Za-z0-9_-]",
                    provider
                )));
            }
            if seen.contains(&provider) {
                return Err(ConfigError::Invalid(format!("Provider '{}' listed twice", provider)));
            }
            if !self.datasets.contains_key(provider) {
                return Err(ConfigError::Invalid(format!(
                    "Provider '{}' has no entry in datasets",
                    provider
                )));
            }
            seen.push(provider);
        }

        for (key, record) in &self.keys {
            if record.limit < -1 {
                return Err(ConfigError::Invalid(format!(
                    "Key '{}' has limit {}; use -1 for unlimited or a value >= 0",
                    key, record.limit
                )));
            }
        }

        Schedule::parse(&self.app.import_schedule)
            .map_err(|e| ConfigError::Invalid(format!("app.import_schedule: {}", e)))?;
        Schedule::parse(&self.app.update_schedule)
            .map_err(|e| ConfigError::Invalid(format!("app.update_schedule: {}", e)))?;

        if self.app.refresh_concurrency == 0 {
            return Err(ConfigError::Invalid("app.refresh_concurrency must be >= 1".into()));
        }

        Ok(())
    }

    /// Provider settings in configuration order
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        self.app
            .providers
            .iter()
            .filter_map(|name| {
                self.datasets.get(name).map(|dataset| ProviderConfig {
                    name: name.clone(),
                    dataset: dataset.clone(),
                })
            })
            .collect()
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
