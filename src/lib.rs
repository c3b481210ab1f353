//! Rocket Pool contract registry
//!
//! Resolves Rocket Pool network contracts by logical name through the
//! canonical RocketStorage contract, with TTL caching, and exposes the
//! superseded deployments of past protocol releases through frozen legacy
//! tables.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod contracts;
pub mod display;
pub mod error;
pub mod keys;
pub mod legacy;
pub mod registry;
pub mod retry;
pub mod types;

// Re-export commonly used types
pub use client::{ChainClient, RpcClient};
pub use config::AppConfig;
pub use contracts::ContractHandle;
pub use contracts::abi::{decode_abi, encode_abi};
pub use error::{RegistryError, Result};
pub use legacy::{LegacyVersionWrapper, VersionManager};
pub use registry::Registry;
pub use retry::RetryConfig;
pub use types::VersionTag;
