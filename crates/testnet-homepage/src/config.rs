//! File-based configuration structures
use crate::inventory::BasicAuth;

use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    net::SocketAddr,
    path::Path,
    str::FromStr,
    time::Duration,
};
use tracing::level_filters::LevelFilter;

/// Default interval between inventory reconciliation cycles.
pub const DEFAULT_INVENTORY_INTERVAL_SECS: u64 = 60;

/// Longest accepted interval between reconciliation cycles, one day.
pub const MAX_INVENTORY_INTERVAL_SECS: u64 = 86_400;

/// Configuration loaded from JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    pub ethereum: EthereumConfig,
    #[serde(default)]
    pub homepage: HomepageConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::Read(format!("Failed to read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            ConfigError::Parse(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.global
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("global config: {e}")))?;
        self.ethereum
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("ethereum config: {e}")))?;

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Load configuration from a JSON string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(format!("Failed to parse JSON: {e}")))
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// API server address
    #[serde(default = "default_listen_addr", alias = "listenAddr")]
    pub listen_addr: SocketAddr,
    /// Log level, overridden by `RUST_LOG` when set
    #[serde(default = "default_logging")]
    pub logging: String,
    /// Metrics server address
    #[serde(default = "default_metrics_addr", alias = "metricsAddr")]
    pub metrics_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5555))
}

fn default_logging() -> String {
    "warn".to_string()
}

fn default_metrics_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9090))
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            logging: default_logging(),
            metrics_addr: default_metrics_addr(),
        }
    }
}

impl GlobalConfig {
    pub fn log_level(&self) -> Result<LevelFilter, String> {
        LevelFilter::from_str(&self.logging)
            .map_err(|_| format!("invalid logging level: {}", self.logging))
    }

    fn validate(&self) -> Result<(), String> {
        self.log_level().map(|_| ())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumConfig {
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

impl EthereumConfig {
    fn validate(&self) -> Result<(), String> {
        if self.network_name.is_empty() {
            return Err("no network name specified".to_string());
        }

        if self.inventory.enabled {
            if self.inventory.url.is_empty() {
                return Err("no inventory URL specified".to_string());
            }

            if self.inventory.interval_secs == 0 {
                return Err("inventory interval must be greater than zero".to_string());
            }

            if self.inventory.interval_secs > MAX_INVENTORY_INTERVAL_SECS {
                return Err(format!(
                    "inventory interval must not exceed {MAX_INVENTORY_INTERVAL_SECS} seconds"
                ));
            }
        }

        Ok(())
    }
}

/// Where and how often to poll the node inventory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_inventory_interval_secs")]
    pub interval_secs: u64,
}

fn default_inventory_interval_secs() -> u64 {
    DEFAULT_INVENTORY_INTERVAL_SECS
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            username: String::new(),
            password: String::new(),
            interval_secs: DEFAULT_INVENTORY_INTERVAL_SECS,
        }
    }
}

impl InventoryConfig {
    /// Credentials are only used when both halves are configured.
    pub fn credentials(&self) -> Option<BasicAuth> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }

        Some(BasicAuth {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

/// Branding shown on the homepage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepageConfig {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub brand_image_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Read(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}
