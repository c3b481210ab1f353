//! Address/ABI registry
//!
//! Resolves logical contract names to their current deployment by reading
//! the canonical storage contract, caching addresses and ABIs separately
//! with a bounded TTL.

use crate::cache::{DEFAULT_CACHE_TTL, TtlCache};
use crate::client::ChainClient;
use crate::contracts::ContractHandle;
use crate::contracts::abi::decode_abi;
use crate::error::{RegistryError, Result};
use crate::keys::{contract_abi_key, contract_address_key};
use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;

/// The single source of truth for current contract deployments
///
/// A zero address is a successful resolution meaning "no contract under
/// this name on this network"; callers check it via
/// [`ContractHandle::is_deployed`] or `Address::is_zero`.
pub struct Registry {
    client: Arc<dyn ChainClient>,
    storage_address: Address,
    addresses: TtlCache<Address>,
    abis: TtlCache<Arc<JsonAbi>>,
    contracts: TtlCache<ContractHandle>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("storage_address", &self.storage_address)
            .field("addresses", &self.addresses)
            .field("abis", &self.abis)
            .field("contracts", &self.contracts)
            .finish()
    }
}

impl Registry {
    /// Create a registry with the default 60 second TTL
    pub fn new(client: Arc<dyn ChainClient>, storage_address: Address) -> Self {
        Self::with_ttl(client, storage_address, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(client: Arc<dyn ChainClient>, storage_address: Address, ttl: Duration) -> Self {
        Self {
            client,
            storage_address,
            addresses: TtlCache::new("address", ttl),
            abis: TtlCache::new("abi", ttl),
            contracts: TtlCache::new("contract", ttl),
        }
    }

    /// Address of the canonical storage contract
    pub fn storage_address(&self) -> Address {
        self.storage_address
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    /// Resolve the current address registered under `name`
    pub async fn get_address(&self, name: &str) -> Result<Address> {
        if let Some(address) = self.addresses.get(name) {
            return Ok(address);
        }

        let _guard = self.addresses.lock_key(name).await;
        if let Some(address) = self.addresses.get(name) {
            return Ok(address);
        }

        let key = contract_address_key(name);
        let address = self
            .client
            .storage_address(self.storage_address, key)
            .await
            .map_err(|e| RegistryError::Resolution {
                name: name.to_string(),
                key,
                reason: e.to_string(),
            })?;

        if address.is_zero() {
            tracing::debug!("{} is not deployed on this network", name);
        }
        self.addresses.insert(name, address);
        Ok(address)
    }

    /// Resolve and decode the current ABI registered under `name`
    pub async fn get_abi(&self, name: &str) -> Result<Arc<JsonAbi>> {
        if let Some(abi) = self.abis.get(name) {
            return Ok(abi);
        }

        let _guard = self.abis.lock_key(name).await;
        if let Some(abi) = self.abis.get(name) {
            return Ok(abi);
        }

        let key = contract_abi_key(name);
        let encoded = self
            .client
            .storage_string(self.storage_address, key)
            .await
            .map_err(|e| RegistryError::Resolution {
                name: name.to_string(),
                key,
                reason: e.to_string(),
            })?;

        let abi = decode_abi(&encoded).map_err(|e| match e {
            RegistryError::Decode(reason) => {
                RegistryError::Decode(format!("ABI for '{name}': {reason}"))
            }
            other => other,
        })?;
        let abi = Arc::new(abi);
        self.abis.insert(name, abi.clone());
        Ok(abi)
    }

    /// Build a handle to the current deployment of `name`
    ///
    /// A name with no deployment yields a handle at the zero address with an
    /// empty ABI (`is_deployed() == false`); no ABI is fetched for it.
    pub async fn get_contract(&self, name: &str) -> Result<ContractHandle> {
        let address = self.get_address(name).await?;
        if address.is_zero() {
            return Ok(ContractHandle::new(
                address,
                Arc::new(JsonAbi::default()),
                self.client.clone(),
            ));
        }

        let abi = self.get_abi(name).await?;
        Ok(ContractHandle::new(address, abi, self.client.clone()))
    }
    /// Uncached read of the address stored under a legacy contract name
    pub async fn get_legacy_address(&self, legacy_name: &str) -> Result<Address> {
        let key = contract_address_key(legacy_name);
        tracing::debug!("Looking up legacy contract {}", legacy_name);
        self.client
            .storage_address(self.storage_address, key)
            .await
            .map_err(|e| RegistryError::Resolution {
                name: legacy_name.to_string(),
                key,
                reason: e.to_string(),
            })
    }

    /// Bind `abi` to an address the caller already knows
    pub fn bind(&self, address: Address, abi: Arc<JsonAbi>) -> ContractHandle {
        ContractHandle::new(address, abi, self.client.clone())
    }

    /// Contract-handle cache, keyed by legacy name
    pub(crate) fn contract_cache(&self) -> &TtlCache<ContractHandle> {
        &self.contracts
    }

    /// Forget the cached address and ABI of `name`
    ///
    /// Useful right after a known redeployment, before the TTL would expire.
    pub fn invalidate(&self, name: &str) {
        self.addresses.invalidate(name);
        self.abis.invalidate(name);
    }

    /// Forget every cached address, ABI and contract handle
    pub fn clear_caches(&self) {
        self.addresses.clear();
        self.abis.clear();
        self.contracts.clear();
    }
}
