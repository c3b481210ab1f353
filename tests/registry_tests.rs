//! Integration tests for the address/ABI registry
//!
//! Tests cover:
//! - TTL caching of addresses (fresh, then refetched after expiry)
//! - Separate address and ABI caches
//! - Resolution failures and their storage keys
//! - Undeployed contracts (zero address)
//! - ABI decode failures
//! - Single fetch for concurrent lookups of the same name

mod common;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use common::{MockChain, NOT_AN_ABI, VERSION_ONLY_ABI, addr, registry};
use rocketpool_registry::error::RegistryError;
use rocketpool_registry::keys::{contract_abi_key, contract_address_key};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_address_cached_until_ttl_expires() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    let registry = registry(&chain);

    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x11));
    assert_eq!(chain.address_reads(), 1);

    tokio::time::advance(Duration::from_secs(30)).await;
    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x11));
    assert_eq!(chain.address_reads(), 1);

    // Redeployed meanwhile; visible once the entry expires
    chain.set_address("rocketNodeManager", addr(0x12));
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x12));
    assert_eq!(chain.address_reads(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_abi_cached_separately_from_address() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    let registry = registry(&chain);

    registry.get_address("rocketNodeManager").await.unwrap();
    assert_eq!(chain.string_reads(), 0);

    let abi = registry.get_abi("rocketNodeManager").await.unwrap();
    assert!(abi.function("version").is_some());
    assert_eq!(chain.string_reads(), 1);
    assert_eq!(chain.address_reads(), 1);

    registry.get_contract("rocketNodeManager").await.unwrap();
    assert_eq!(chain.string_reads(), 1);
    assert_eq!(chain.address_reads(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    let registry = registry(&chain);

    registry.get_contract("rocketNodeManager").await.unwrap();
    chain.set_address("rocketNodeManager", addr(0x12));
    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x11));

    registry.invalidate("rocketNodeManager");
    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x12));
    assert_eq!(chain.address_reads(), 2);

    registry.clear_caches();
    registry.get_abi("rocketNodeManager").await.unwrap();
    assert_eq!(chain.string_reads(), 2);
}

#[tokio::test]
async fn test_resolution_error_carries_name_and_key() {
    let chain = MockChain::new();
    chain.set_failing(true);
    let registry = registry(&chain);

    match registry.get_address("rocketNodeManager").await {
        Err(RegistryError::Resolution { name, key, .. }) => {
            assert_eq!(name, "rocketNodeManager");
            assert_eq!(key, contract_address_key("rocketNodeManager"));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }

    match registry.get_abi("rocketNodeManager").await {
        Err(RegistryError::Resolution { key, .. }) => {
            assert_eq!(key, contract_abi_key("rocketNodeManager"));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    chain.set_failing(true);
    let registry = registry(&chain);

    assert!(registry.get_address("rocketNodeManager").await.is_err());

    chain.set_failing(false);
    assert_eq!(registry.get_address("rocketNodeManager").await.unwrap(), addr(0x11));
}

#[tokio::test]
async fn test_undeployed_contract_resolves_to_zero() {
    let chain = MockChain::new();
    let registry = registry(&chain);

    let address = registry.get_address("rocketMissing").await.unwrap();
    assert_eq!(address, Address::ZERO);

    // The zero address is a value like any other and is cached
    registry.get_address("rocketMissing").await.unwrap();
    assert_eq!(chain.address_reads(), 1);
}

#[tokio::test]
async fn test_get_contract_for_undeployed_name_skips_abi() {
    let chain = MockChain::new();
    let registry = registry(&chain);

    let contract = registry.get_contract("rocketMissing").await.unwrap();
    assert!(!contract.is_deployed());
    assert_eq!(contract.address(), Address::ZERO);
    assert_eq!(chain.string_reads(), 0);
}

#[tokio::test]
async fn test_corrupt_abi_is_decode_error() {
    let chain = MockChain::new();
    chain.deploy("rocketNotAbi", addr(0x21), NOT_AN_ABI);
    chain.deploy("rocketGarbage", addr(0x22), "!!! not base64 !!!");
    let registry = registry(&chain);

    match registry.get_abi("rocketNotAbi").await {
        Err(RegistryError::Decode(reason)) => {
            assert!(reason.contains("rocketNotAbi"));
            assert!(reason.contains("invalid ABI JSON"));
        }
        other => panic!("expected decode error, got {other:?}"),
    }

    match registry.get_contract("rocketGarbage").await {
        Err(RegistryError::Decode(reason)) => assert!(reason.contains("invalid base64")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_lookups_share_one_fetch() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    chain.set_delay(Duration::from_millis(200));
    let registry = registry(&chain);

    let (a, b, c) = tokio::join!(
        registry.get_contract("rocketNodeManager"),
        registry.get_contract("rocketNodeManager"),
        registry.get_contract("rocketNodeManager"),
    );

    for contract in [a, b, c] {
        assert_eq!(contract.unwrap().address(), addr(0x11));
    }
    assert_eq!(chain.address_reads(), 1);
    assert_eq!(chain.string_reads(), 1);
}

#[tokio::test]
async fn test_contract_handle_calls() {
    let chain = MockChain::new();
    chain.deploy("rocketNodeManager", addr(0x11), VERSION_ONLY_ABI);
    chain.set_version(addr(0x11), 3);
    let registry = registry(&chain);

    let contract = registry.get_contract("rocketNodeManager").await.unwrap();
    let values = contract.call("version", &[]).await.unwrap();
    assert_eq!(values, vec![DynSolValue::Uint(U256::from(3), 8)]);

    let result = contract.call("getNodeCount", &[]).await;
    assert!(matches!(result, Err(RegistryError::Call(_))));
    assert_eq!(chain.calls(), 1);
}
