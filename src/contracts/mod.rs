/// Contract handles
///
/// A `ContractHandle` pairs a deployed address with a parsed ABI and exposes
/// read calls against it. Handles are immutable and cheap to clone; the
/// registry builds a fresh one on every resolution.
///
/// # Architecture
///
/// - `ContractHandle`: address + ABI + chain binding
/// - `abi`: compressed-ABI codec and the storage contract ABI (sol! macro)
/// - `version`: contract version probe and network version detection
pub mod abi;
pub mod version;

use crate::client::ChainClient;
use crate::error::{RegistryError, Result};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use std::sync::Arc;

/// A callable binding to one deployed contract
///
/// # Example
///
/// ```ignore
/// let pool = registry.get_contract("rocketRewardsPool").await?;
/// let start = pool.call("getClaimIntervalTimeStart", &[]).await?;
/// ```
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
    client: Arc<dyn ChainClient>,
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("functions", &self.abi.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContractHandle {
    pub fn new(address: Address, abi: Arc<JsonAbi>, client: Arc<dyn ChainClient>) -> Self {
        Self {
            address,
            abi,
            client,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Whether the handle points at a deployment (non-zero address)
    pub fn is_deployed(&self) -> bool {
        !self.address.is_zero()
    }

    /// Perform a read-only call of `method` with `args`
    ///
    /// Fails with `RegistryError::Call` if the ABI has no such method, and
    /// with `RegistryError::Rpc` if the call itself fails.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        if self.abi.function(method).is_none() {
            return Err(RegistryError::Call(format!(
                "contract at {} has no method '{method}'",
                self.address
            )));
        }

        self.client.call(self.address, &self.abi, method, args).await
    }
}
