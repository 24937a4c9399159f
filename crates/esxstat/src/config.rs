//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use esxstat_core::{ConfigError, EndpointConfig};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "ESXSTAT_CONFIG";

/// Top-level configuration for the esxstat daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Daemon server settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Endpoint to poll
    pub esxi: EndpointConfig,
}

/// Daemon server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address and port to bind to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Log level (trace, debug, info, warn, error), `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds between scheduler ticks
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// Paths that must exist before the daemon starts
    #[serde(default)]
    pub required_files: Vec<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            update_interval: default_update_interval(),
            required_files: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_update_interval() -> u64 {
    30
}

impl DaemonConfig {
    /// Scheduler tick period
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }
}

impl Config {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error if the document is malformed or a value is out of range
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    /// Load from `ESXSTAT_CONFIG` or the first default path that exists
    ///
    /// # Errors
    /// Returns error if no config file is found or the one found is invalid
    pub fn load_default() -> eyre::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        eyre::bail!("no config file found (set {CONFIG_ENV} or pass --config)")
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("esxstat.toml"),
            PathBuf::from("/etc/esxstat/esxstat.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("esxstat/esxstat.toml"));
        }
        paths
    }

    /// Check value constraints
    ///
    /// # Errors
    /// Returns the first `ConfigError` found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.update_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "update_interval",
                reason: "must be a positive integer".to_string(),
            });
        }
        self.esxi.validate()
    }
}
