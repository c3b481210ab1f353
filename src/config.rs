/// Configuration module for rocketpool-registry
///
/// Layered configuration:
///
/// 1. Environment variables (`ROCKETPOOL__` prefix, highest priority)
/// 2. Configuration file (YAML, TOML or JSON)
/// 3. Built-in defaults (lowest priority)
///
/// # Example
///
/// ```ignore
/// // Load from default locations
/// let config = AppConfig::load()?;
///
/// // Load from specific file
/// let config = AppConfig::load_from_file("config.toml")?;
/// ```
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Mainnet RocketStorage deployment
pub const MAINNET_STORAGE_ADDRESS: &str = "0x1d8f8f00cfa6758d7bE78336684788Fb0ee0Fa46";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// RPC configuration
    pub rpc: RpcConfig,

    /// Canonical storage contract
    pub storage: StorageConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Retry configuration
    pub retry: RetryConfig,
}

/// RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Execution-layer RPC endpoint URL
    pub url: String,
}

/// Canonical storage contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// RocketStorage address (hex string with 0x prefix)
    pub address: String,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a cached address, ABI or contract handle
    ///
    /// Default: 60
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

pub use crate::retry::RetryConfig;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig {
                url: "http://localhost:8545".to_string(),
            },
            storage: StorageConfig {
                address: MAINNET_STORAGE_ADDRESS.to_string(),
            },
            cache: CacheConfig { ttl_seconds: 60 },
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration with default search paths
    ///
    /// Searches for config files in this order:
    /// 1. `./config.{yaml,toml,json}` (current directory)
    /// 2. `~/.config/rocketpool-registry/config.{yaml,toml,json}` (user config)
    ///
    /// If no config file is found, uses built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_optional_file(None)
    }

    /// Load configuration from a specific file (must exist)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_from_optional_file(Some(path.as_ref()))
    }

    fn load_from_optional_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(config_path) = path {
            builder = builder.add_source(File::from(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("config").required(false))
                .add_source(File::with_name("~/.config/rocketpool-registry/config").required(false));
        }

        // ROCKETPOOL__RPC__URL=http://... overrides rpc.url
        // ROCKETPOOL__CACHE__TTL_SECONDS=30 overrides cache.ttl_seconds
        builder = builder.add_source(
            Environment::with_prefix("ROCKETPOOL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, or an error message describing the problem.
    pub fn validate(&self) -> Result<(), String> {
        if !self.rpc.url.starts_with("http://") && !self.rpc.url.starts_with("https://") {
            return Err(format!(
                "Invalid RPC URL '{}': must start with http:// or https://",
                self.rpc.url
            ));
        }

        let address = &self.storage.address;
        if !address.starts_with("0x") {
            return Err(format!("Storage address '{address}' must start with 0x"));
        }
        if address.len() != 42 {
            return Err(format!(
                "Storage address '{address}' must be 42 characters (0x + 40 hex digits)"
            ));
        }
        if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Storage address '{address}' contains non-hex characters"
            ));
        }
        if address[2..].chars().all(|c| c == '0') {
            return Err("Storage address cannot be the zero address".to_string());
        }

        if self.cache.ttl_seconds == 0 {
            return Err("Cache ttl_seconds must be greater than 0".to_string());
        }

        if self.retry.initial_delay_ms == 0 {
            return Err("Retry initial_delay_ms must be greater than 0".to_string());
        }

        if self.retry.backoff_multiplier == 0 {
            return Err("Retry backoff_multiplier must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Parsed storage contract address
    pub fn storage_address(&self) -> Result<alloy::primitives::Address, String> {
        self.storage
            .address
            .parse()
            .map_err(|e| format!("Invalid storage address '{}': {e}", self.storage.address))
    }
}
