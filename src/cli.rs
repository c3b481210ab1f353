use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    client::RpcClient,
    config::AppConfig,
    contracts::abi::{decode_abi, encode_abi},
    contracts::version::{detect_network_version, get_contract_version},
    display,
    legacy::VersionManager,
    registry::Registry,
    types::VersionTag,
};

/// Rocket Pool contract registry tool
///
/// Resolve Rocket Pool contracts by name, including superseded deployments
#[derive(Parser, Debug)]
#[command(name = "rocketpool-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, env = "ROCKETPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Execution-layer RPC endpoint URL (overrides configuration)
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// RocketStorage address (overrides configuration)
    #[arg(long)]
    pub storage_address: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the current address of one or more contracts
    Address {
        /// Contract names (e.g. rocketRewardsPool)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the current ABI of a contract as JSON
    Abi {
        /// Contract name
        name: String,
    },

    /// Read the version a contract reports
    Version {
        /// Contract name
        name: String,
    },

    /// Detect which protocol release is live on the network
    NetworkVersion,

    /// List the legacy releases and the contracts each replaced
    Versions,

    /// Resolve a contract as it existed at a legacy release
    Legacy {
        /// Release version (e.g. 1.0.0)
        version: String,

        /// Contract name
        name: String,

        /// Bind the legacy ABI to this address instead of resolving one
        #[arg(long)]
        address: Option<String>,
    },

    /// Encode an ABI JSON file into the compressed on-chain form
    EncodeAbi {
        /// Path to the ABI JSON file
        file: PathBuf,
    },

    /// Decode a compressed ABI blob and print it as JSON
    DecodeAbi {
        /// Encoded ABI
        blob: String,
    },
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };

        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(address) = &self.storage_address {
            config.storage.address = address.clone();
        }

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    fn build_registry(&self) -> Result<Arc<Registry>> {
        let config = self.load_config()?;
        let storage_address = config.storage_address().map_err(anyhow::Error::msg)?;
        let client = RpcClient::new(&config.rpc.url, config.retry.clone())?;

        tracing::info!(
            "Using RocketStorage at {} via {}",
            storage_address,
            config.rpc.url
        );
        Ok(Arc::new(Registry::with_ttl(
            Arc::new(client),
            storage_address,
            config.cache.ttl(),
        )))
    }

    pub async fn execute(self) -> Result<()> {
        match &self.command {
            Commands::Address { names } => {
                let registry = self.build_registry()?;
                let lookups = names.iter().map(|name| {
                    let registry = registry.clone();
                    async move {
                        let result = registry
                            .get_address(name)
                            .await
                            .map_err(|e| e.to_string());
                        (name.clone(), result)
                    }
                });
                let results = futures::future::join_all(lookups).await;
                display::display_addresses(&results);
            }
            Commands::Abi { name } => {
                let registry = self.build_registry()?;
                let abi = registry.get_abi(name).await?;
                println!("{}", serde_json::to_string_pretty(abi.as_ref())?);
            }
            Commands::Version { name } => {
                let registry = self.build_registry()?;
                let address = registry.get_address(name).await?;
                if address.is_zero() {
                    anyhow::bail!("{name} is not deployed on this network");
                }
                let version = get_contract_version(&registry, address).await?;
                println!("{name} ({address}) reports version {version}");
            }
            Commands::NetworkVersion => {
                let registry = self.build_registry()?;
                let version = detect_network_version(&registry).await?;
                println!("Network is running protocol version {version}");
            }
            Commands::Versions => {
                let registry = self.build_registry()?;
                let manager = VersionManager::new(registry)?;
                display::display_legacy_tables(&manager);
            }
            Commands::Legacy {
                version,
                name,
                address,
            } => {
                let registry = self.build_registry()?;
                let manager = VersionManager::new(registry)?;
                let version: VersionTag = version.parse()?;

                let contract = match address {
                    Some(address) => {
                        let address = address
                            .parse::<Address>()
                            .with_context(|| format!("Invalid address '{address}'"))?;
                        manager.get_contract_with_address(&version, name, address)?
                    }
                    None => manager.get_contract(&version, name).await?,
                };
                display::display_contract(&format!("{name} @ {version}"), &contract);
            }
            Commands::EncodeAbi { file } => {
                let json = std::fs::read_to_string(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let _: alloy::json_abi::JsonAbi = serde_json::from_str(&json)
                    .with_context(|| format!("{} is not a JSON ABI", file.display()))?;
                println!("{}", encode_abi(&json)?);
            }
            Commands::DecodeAbi { blob } => {
                let abi = decode_abi(blob)?;
                println!("{}", serde_json::to_string_pretty(&abi)?);
            }
        }

        Ok(())
    }
}
