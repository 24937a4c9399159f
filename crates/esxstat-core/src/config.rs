//! Configuration types for the monitored endpoint

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inventory object kinds that can be monitored
///
/// Declaration order is the order in which a poll cycle processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// ESXi hosts
    Hosts,
    /// Datastores
    Datastores,
    /// Virtual machines
    Vms,
}

impl Category {
    /// Every category, in poll order
    pub const ALL: [Category; 3] = [Category::Hosts, Category::Datastores, Category::Vms];

    /// Configuration name of the category
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hosts => "hosts",
            Category::Datastores => "datastores",
            Category::Vms => "vms",
        }
    }

    /// Human readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Hosts => "ESXi Host",
            Category::Datastores => "Datastores",
            Category::Vms => "Virtual Machines",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosts" => Ok(Category::Hosts),
            "datastores" => Ok(Category::Datastores),
            "vms" => Ok(Category::Vms),
            other => Err(ConfigError::UnknownCategory(other.to_string())),
        }
    }
}

/// Connection and polling settings for one ESXi/vCenter endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Address of the management endpoint
    pub host: String,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// HTTPS port (defaults to 443)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Verify the endpoint's TLS certificate (defaults to off)
    #[serde(default)]
    pub verify_ssl: bool,
    /// Friendly name used for sensor naming
    #[serde(default = "default_name")]
    pub name: String,
    /// Minimum seconds between two poll cycles
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    /// Categories to poll
    #[serde(default = "default_monitored_conditions")]
    pub monitored_conditions: Vec<Category>,
    /// Seconds allowed for any single endpoint call
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_port() -> u16 {
    443
}

fn default_name() -> String {
    "ESXi Stats".to_string()
}

fn default_scan_interval() -> u64 {
    60
}

fn default_monitored_conditions() -> Vec<Category> {
    vec![Category::Hosts]
}

fn default_timeout() -> u64 {
    30
}

impl EndpointConfig {
    /// Create a configuration with defaults for every optional setting
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: default_port(),
            verify_ssl: false,
            name: default_name(),
            scan_interval: default_scan_interval(),
            monitored_conditions: default_monitored_conditions(),
            timeout: default_timeout(),
        }
    }

    /// Replace the monitored categories
    #[must_use]
    pub fn with_monitored(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.monitored_conditions = categories.into_iter().collect();
        self
    }

    /// Check field constraints that serde cannot express
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("host", "must not be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::invalid("username", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must be a positive integer"));
        }
        if self.scan_interval == 0 {
            return Err(ConfigError::invalid(
                "scan_interval",
                "must be a positive integer",
            ));
        }
        if self.timeout == 0 {
            return Err(ConfigError::invalid("timeout", "must be a positive integer"));
        }
        Ok(())
    }

    /// Whether `category` is polled
    #[must_use]
    pub fn monitors(&self, category: Category) -> bool {
        self.monitored_conditions.contains(&category)
    }

    /// Minimum interval between poll cycles
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    /// Bound for a single endpoint call
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("verify_ssl", &self.verify_ssl)
            .field("name", &self.name)
            .field("scan_interval", &self.scan_interval)
            .field("monitored_conditions", &self.monitored_conditions)
            .field("timeout", &self.timeout)
            .finish()
    }
}
