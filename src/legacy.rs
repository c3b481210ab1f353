//! Legacy contract versions
//!
//! Protocol upgrades replace contracts, but historical state (past reward
//! intervals, old minipools) stays in the superseded deployments. Each
//! upgrade that renamed contracts gets a [`LegacyVersionWrapper`]: a frozen
//! table of the contracts it replaced, the name each was re-registered
//! under in RocketStorage, and the ABI it had at the time.
//!
//! The tables are embedded JSON files under `data/legacy/`, one per release.
//! Nothing picks "the latest applicable release" implicitly: every lookup
//! names the release it wants.

use crate::contracts::ContractHandle;
use crate::contracts::abi::decode_abi;
use crate::error::{RegistryError, Result};
use crate::registry::Registry;
use crate::types::VersionTag;
use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const EMBEDDED_TABLES: &[(&str, &str)] = &[
    ("v1.0.0.json", include_str!("../data/legacy/v1.0.0.json")),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyContractData {
    legacy_name: String,
    abi: String,
}

#[derive(Debug, Deserialize)]
struct LegacyTableData {
    version: VersionTag,
    contracts: HashMap<String, LegacyContractData>,
}

/// One contract replaced at a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyContract {
    /// Name the superseded deployment is registered under in storage
    pub legacy_name: String,
    /// ABI of the superseded deployment, in encoded form
    pub encoded_abi: String,
}

/// Frozen view of the contracts a single release replaced
#[derive(Debug, Clone)]
pub struct LegacyVersionWrapper {
    version: VersionTag,
    contracts: HashMap<String, LegacyContract>,
}

impl LegacyVersionWrapper {
    /// Create an empty table for `version`
    pub fn new(version: VersionTag) -> Self {
        Self {
            version,
            contracts: HashMap::new(),
        }
    }

    /// Add a replaced contract to the table
    pub fn with_contract(
        mut self,
        name: impl Into<String>,
        legacy_name: impl Into<String>,
        encoded_abi: impl Into<String>,
    ) -> Self {
        self.contracts.insert(
            name.into(),
            LegacyContract {
                legacy_name: legacy_name.into(),
                encoded_abi: encoded_abi.into(),
            },
        );
        self
    }

    /// Parse a table from its JSON data file
    pub fn from_json(json: &str) -> Result<Self> {
        let data: LegacyTableData = serde_json::from_str(json)
            .map_err(|e| RegistryError::Config(format!("Invalid legacy version table: {e}")))?;

        let contracts = data
            .contracts
            .into_iter()
            .map(|(name, entry)| {
                (
                    name,
                    LegacyContract {
                        legacy_name: entry.legacy_name,
                        encoded_abi: entry.abi,
                    },
                )
            })
            .collect();

        Ok(Self {
            version: data.version,
            contracts,
        })
    }

    pub fn version(&self) -> &VersionTag {
        &self.version
    }

    /// Name `name` was re-registered under at this release, if it was replaced
    pub fn legacy_name(&self, name: &str) -> Option<&str> {
        self.contracts.get(name).map(|c| c.legacy_name.as_str())
    }

    /// Frozen encoded ABI of `name` at this release, if it was replaced
    pub fn encoded_abi(&self, name: &str) -> Option<&str> {
        self.contracts.get(name).map(|c| c.encoded_abi.as_str())
    }

    /// Logical names of the contracts this release replaced, sorted
    pub fn contract_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contracts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn decode_frozen_abi(&self, name: &str, encoded: &str) -> Result<Arc<JsonAbi>> {
        decode_abi(encoded).map(Arc::new).map_err(|e| match e {
            RegistryError::Decode(reason) => RegistryError::Decode(format!(
                "legacy ABI for '{name}' in version {}: {reason}",
                self.version
            )),
            other => other,
        })
    }

    /// Resolve `name` as it existed at this release
    ///
    /// 1. Not replaced at this release: the registry's current contract.
    /// 2. Replaced, handle cached under the legacy name: the cached handle.
    /// 3. Replaced, legacy name resolves to the zero address (never deployed
    ///    on this network): the registry's current contract.
    /// 4. Otherwise: the legacy address bound to the frozen ABI, cached.
    pub async fn get_contract(&self, registry: &Registry, name: &str) -> Result<ContractHandle> {
        let Some(legacy) = self.contracts.get(name) else {
            return registry.get_contract(name).await;
        };
        let legacy_name = legacy.legacy_name.as_str();

        let cache = registry.contract_cache();
        if let Some(contract) = cache.get(legacy_name) {
            return Ok(contract);
        }

        let _guard = cache.lock_key(legacy_name).await;
        if let Some(contract) = cache.get(legacy_name) {
            return Ok(contract);
        }

        let address = registry.get_legacy_address(legacy_name).await?;
        if address.is_zero() {
            tracing::info!(
                "{} is not deployed on this network, using current {}",
                legacy_name,
                name
            );
            return registry.get_contract(name).await;
        }

        let abi = self.decode_frozen_abi(name, &legacy.encoded_abi)?;
        let contract = registry.bind(address, abi);
        cache.insert(legacy_name, contract.clone());
        Ok(contract)
    }

    /// Bind the frozen ABI of `name` to an address the caller already knows
    ///
    /// No chain access. Fails with `NotInVersion` if this release did not
    /// replace `name`, or `Decode` if the frozen ABI is corrupt.
    pub fn get_contract_with_address(
        &self,
        registry: &Registry,
        name: &str,
        address: Address,
    ) -> Result<ContractHandle> {
        let legacy = self
            .contracts
            .get(name)
            .ok_or_else(|| RegistryError::NotInVersion {
                name: name.to_string(),
                version: self.version.to_string(),
            })?;

        let abi = self.decode_frozen_abi(name, &legacy.encoded_abi)?;
        Ok(registry.bind(address, abi))
    }
}

/// All known legacy releases, addressable by version tag
pub struct VersionManager {
    registry: Arc<Registry>,
    wrappers: BTreeMap<VersionTag, LegacyVersionWrapper>,
}

impl std::fmt::Debug for VersionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionManager")
            .field("versions", &self.wrappers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl VersionManager {
    /// Build a manager from the embedded release tables
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let wrappers = EMBEDDED_TABLES
            .iter()
            .map(|(file, json)| {
                LegacyVersionWrapper::from_json(json).map_err(|e| {
                    RegistryError::Config(format!("Embedded legacy table {file}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::with_wrappers(registry, wrappers)
    }

    /// Build a manager from explicit tables
    ///
    /// Two tables for the same release are a configuration error.
    pub fn with_wrappers(
        registry: Arc<Registry>,
        wrappers: impl IntoIterator<Item = LegacyVersionWrapper>,
    ) -> Result<Self> {
        let mut by_version = BTreeMap::new();
        for wrapper in wrappers {
            let version = wrapper.version().clone();
            if by_version.insert(version.clone(), wrapper).is_some() {
                return Err(RegistryError::Config(format!(
                    "Duplicate legacy table for version {version}"
                )));
            }
        }

        tracing::debug!("Loaded {} legacy version tables", by_version.len());
        Ok(Self {
            registry,
            wrappers: by_version,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Known releases, oldest first
    pub fn versions(&self) -> impl Iterator<Item = &VersionTag> {
        self.wrappers.keys()
    }

    /// The table for `version`
    pub fn wrapper(&self, version: &VersionTag) -> Result<&LegacyVersionWrapper> {
        self.wrappers
            .get(version)
            .ok_or_else(|| RegistryError::UnknownVersion(version.to_string()))
    }

    /// Resolve `name` as it existed at `version`
    pub async fn get_contract(&self, version: &VersionTag, name: &str) -> Result<ContractHandle> {
        self.wrapper(version)?
            .get_contract(&self.registry, name)
            .await
    }

    /// Bind the `version` ABI of `name` to a known address
    pub fn get_contract_with_address(
        &self,
        version: &VersionTag,
        name: &str,
        address: Address,
    ) -> Result<ContractHandle> {
        self.wrapper(version)?
            .get_contract_with_address(&self.registry, name, address)
    }
}
