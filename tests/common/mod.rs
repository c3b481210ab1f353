//! In-memory chain used by the integration tests
//!
//! Storage keys are derived exactly as on-chain, so tests register contracts
//! by name and the registry finds them by hashing.

#![allow(dead_code)]

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256, U256, address};
use async_trait::async_trait;
use parking_lot::Mutex;
use rocketpool_registry::error::{RegistryError, Result};
use rocketpool_registry::keys::{contract_abi_key, contract_address_key};
use rocketpool_registry::{ChainClient, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const STORAGE: Address = address!("5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a");

/// Encoded ABI exposing only `version() -> uint8`
pub const VERSION_ONLY_ABI: &str = "eJyLrlbKzCsoLSlWsoqO1VHKS8xNVbJSKkstKs7Mz1PSUcovLYHKghSWpBblJeaEVBaAFJUC+RZKcD1AVgmyRC3QuOKSxJJU39KSxKTMnMySSpDJmanlCJVppXnJJSCLamMBipoukQ==";

/// Valid base64 and zlib, but the payload is `{"not":"an abi"}`
pub const NOT_AN_ABI: &str = "eJyrVsrLL1GyUkrMU0hMylSqBQAr9AUn";

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

#[derive(Default)]
pub struct MockChain {
    addresses: Mutex<HashMap<B256, Address>>,
    strings: Mutex<HashMap<B256, String>>,
    versions: Mutex<HashMap<Address, u8>>,
    address_reads: AtomicUsize,
    string_reads: AtomicUsize,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `name` at `address` with an encoded ABI
    pub fn deploy(&self, name: &str, address: Address, encoded_abi: &str) {
        self.set_address(name, address);
        self.strings
            .lock()
            .insert(contract_abi_key(name), encoded_abi.to_string());
    }

    pub fn set_address(&self, name: &str, address: Address) {
        self.addresses
            .lock()
            .insert(contract_address_key(name), address);
    }

    /// Make `version()` on `address` return `version`
    pub fn set_version(&self, address: Address, version: u8) {
        self.versions.lock().insert(address, version);
    }

    /// Make every storage read and call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay storage reads, so concurrent callers overlap
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn address_reads(&self) -> usize {
        self.address_reads.load(Ordering::SeqCst)
    }

    pub fn string_reads(&self) -> usize {
        self.string_reads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn before_read(&self) -> Result<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RegistryError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn storage_address(&self, _storage: Address, key: B256) -> Result<Address> {
        self.address_reads.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self
            .addresses
            .lock()
            .get(&key)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn storage_string(&self, _storage: Address, key: B256) -> Result<String> {
        self.string_reads.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self.strings.lock().get(&key).cloned().unwrap_or_default())
    }

    async fn call(
        &self,
        address: Address,
        _abi: &JsonAbi,
        method: &str,
        _args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RegistryError::Rpc("connection refused".to_string()));
        }

        let version = self.versions.lock().get(&address).copied();
        match (method, version) {
            ("version", Some(version)) => {
                Ok(vec![DynSolValue::Uint(U256::from(version), 8)])
            }
            _ => Err(RegistryError::Rpc("execution reverted".to_string())),
        }
    }
}

pub fn registry(chain: &Arc<MockChain>) -> Registry {
    Registry::new(chain.clone(), STORAGE)
}
