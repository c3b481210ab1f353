use alloy::primitives::{Address, B256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The storage lookup for a contract failed (not the same as the contract being absent)
    #[error("Could not resolve '{name}' (storage key {key}): {reason}")]
    Resolution {
        name: String,
        key: B256,
        reason: String,
    },

    /// The contract did not answer `version()`, e.g. it predates the interface
    #[error("Could not read version of {address}: {reason}")]
    VersionProbe { address: Address, reason: String },

    #[error("ABI decode error: {0}")]
    Decode(String),

    #[error("ABI encode error: {0}")]
    Encode(String),

    #[error("Contract call error: {0}")]
    Call(String),

    #[error("Unknown protocol version '{0}'")]
    UnknownVersion(String),

    #[error("Contract '{name}' has no legacy ABI in version {version}")]
    NotInVersion { name: String, version: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
