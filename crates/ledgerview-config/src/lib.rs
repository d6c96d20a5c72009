//! Configuration management for ledgerview
//!
//! This module handles loading, validation, and management of
//! ledgerview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

/// Upper bound for simulated latency, in milliseconds
pub const MAX_LATENCY_MS: u64 = 60_000;

// ==================== Configuration Types ====================

/// Fixture data settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON fixture with employees and transactions
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
        }
    }
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("./data/ledger.json")
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows per page of the unfiltered transaction feed
    #[serde(default = "default_transactions_per_page")]
    pub transactions_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            transactions_per_page: default_transactions_per_page(),
        }
    }
}

fn default_transactions_per_page() -> usize {
    5
}

/// Simulated transport latency
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LatencyConfig {
    /// Delay applied to employee directory requests
    #[serde(default)]
    pub employees_ms: u64,
    /// Delay applied to transaction requests
    #[serde(default)]
    pub transactions_ms: u64,
}

/// Session behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Trigger the startup load when the directory is absent
    #[serde(default = "default_true")]
    pub auto_bootstrap: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_bootstrap: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Fixture data settings
    #[serde(default)]
    pub data: DataConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Simulated latency
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pagination.transactions_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.transactions_per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        for (field, value) in [
            ("latency.employees_ms", self.latency.employees_ms),
            ("latency.transactions_ms", self.latency.transactions_ms),
        ] {
            if value > MAX_LATENCY_MS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("Latency must be at most {} ms", MAX_LATENCY_MS),
                });
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level: {}", other),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Get the path to the fixture file
    pub fn fixture_path(&self) -> &Path {
        &self.data.fixture_path
    }
}
