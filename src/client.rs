use crate::contracts::abi::RocketStorage;
use crate::error::{RegistryError, Result};
use crate::retry::RetryConfig;
use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::network::Ethereum;
use alloy::primitives::{Address, B256};
use alloy::providers::{ProviderBuilder, RootProvider};
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;

/// Read access to the chain, as needed by the registry
///
/// This is the only seam between resolution logic and the network. The
/// registry, contract handles and version manager hold it as
/// `Arc<dyn ChainClient>` so tests can substitute an in-memory chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Read `getAddress(key)` from the storage contract
    ///
    /// An unset key yields the zero address, not an error.
    async fn storage_address(&self, storage: Address, key: B256) -> Result<Address>;

    /// Read `getString(key)` from the storage contract
    async fn storage_string(&self, storage: Address, key: B256) -> Result<String>;

    /// Perform a read-only call of `method` on the contract at `address`
    async fn call(
        &self,
        address: Address,
        abi: &JsonAbi,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>>;
}

/// JSON-RPC implementation of [`ChainClient`] over HTTP
#[derive(Clone)]
pub struct RpcClient {
    provider: RootProvider<Http<Client>>,
    retry: RetryConfig,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create a new client for an execution-layer RPC endpoint
    pub fn new(rpc_url: &str, retry: RetryConfig) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| RegistryError::Config(format!("Invalid RPC URL: {e}")))?,
        );

        Ok(Self { provider, retry })
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn storage_address(&self, storage: Address, key: B256) -> Result<Address> {
        let contract = RocketStorage::new(storage, self.provider.clone());

        tracing::debug!("RPC: getAddress(key={})", key);
        self.retry
            .execute(|| async { contract.getAddress(key).call().await.map(|r| r._0) })
            .await
            .map_err(|e| RegistryError::Rpc(format!("getAddress({key}) failed: {e}")))
    }

    async fn storage_string(&self, storage: Address, key: B256) -> Result<String> {
        let contract = RocketStorage::new(storage, self.provider.clone());

        tracing::debug!("RPC: getString(key={})", key);
        self.retry
            .execute(|| async { contract.getString(key).call().await.map(|r| r._0) })
            .await
            .map_err(|e| RegistryError::Rpc(format!("getString({key}) failed: {e}")))
    }

    async fn call(
        &self,
        address: Address,
        abi: &JsonAbi,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        let instance = ContractInstance::<Http<Client>, _, Ethereum>::new(
            address,
            self.provider.clone(),
            Interface::new(abi.clone()),
        );
        let call = instance
            .function(method, args)
            .map_err(|e| RegistryError::Call(format!("Could not encode {method}: {e}")))?;

        tracing::debug!("RPC: {}() on {}", method, address);
        self.retry
            .execute(|| async { call.call().await })
            .await
            .map_err(|e| RegistryError::Rpc(format!("{method}() on {address} failed: {e}")))
    }
}
