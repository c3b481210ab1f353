/// Contract version probe
///
/// Every network contract since the first release inherits a public
/// `uint8 version` field. Reading it tells higher layers which release a
/// deployment belongs to.
use super::abi::version_abi;
use crate::error::{RegistryError, Result};
use crate::registry::Registry;
use crate::types::VersionTag;
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Ask the contract at `address` which version it reports
///
/// Fails with `RegistryError::VersionProbe` if the call fails, which includes
/// contracts that predate the version interface. Callers should read that
/// as "earliest version", see [`get_contract_version_or_earliest`].
pub async fn get_contract_version(registry: &Registry, address: Address) -> Result<u8> {
    let handle = registry.bind(address, Arc::new(version_abi()?));
    let values = handle
        .call("version", &[])
        .await
        .map_err(|e| RegistryError::VersionProbe {
            address,
            reason: e.to_string(),
        })?;

    match values.first() {
        Some(DynSolValue::Uint(value, _)) if *value <= U256::from(u8::MAX) => {
            Ok(value.to::<u8>())
        }
        other => Err(RegistryError::VersionProbe {
            address,
            reason: format!("unexpected version() output: {other:?}"),
        }),
    }
}

/// Like [`get_contract_version`], but a failed probe reads as version 0
pub async fn get_contract_version_or_earliest(registry: &Registry, address: Address) -> u8 {
    match get_contract_version(registry, address).await {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!(
                "Contract {} did not report a version, assuming earliest: {}",
                address,
                e
            );
            0
        }
    }
}

/// Work out which protocol release is live on this network
///
/// - `rocketNodeStaking` version above 3: 1.2.0
/// - `rocketNodeManager` version above 1: 1.1.0
/// - otherwise: 1.0.0
pub async fn detect_network_version(registry: &Registry) -> Result<VersionTag> {
    let node_staking = registry.get_address("rocketNodeStaking").await?;
    if get_contract_version_or_earliest(registry, node_staking).await > 3 {
        return Ok(VersionTag::new(1, 2, 0));
    }

    let node_manager = registry.get_address("rocketNodeManager").await?;
    if get_contract_version_or_earliest(registry, node_manager).await > 1 {
        return Ok(VersionTag::new(1, 1, 0));
    }

    Ok(VersionTag::new(1, 0, 0))
}
