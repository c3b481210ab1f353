//! Storage key derivation for the canonical storage contract
//!
//! RocketStorage indexes its directory by `keccak256(prefix ++ name)` over the
//! raw UTF-8 bytes (Solidity `abi.encodePacked`). These must stay bit-exact.

use alloy::primitives::{B256, keccak256};

const CONTRACT_ADDRESS_PREFIX: &[u8] = b"contract.address";
const CONTRACT_ABI_PREFIX: &[u8] = b"contract.abi";

fn packed_key(prefix: &[u8], suffix: &[u8]) -> B256 {
    let mut buf = Vec::with_capacity(prefix.len() + suffix.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(suffix);
    keccak256(&buf)
}

/// Key of the address registered under a contract name (current or legacy)
pub fn contract_address_key(name: &str) -> B256 {
    packed_key(CONTRACT_ADDRESS_PREFIX, name.as_bytes())
}

/// Key of the encoded ABI registered under a contract name
pub fn contract_abi_key(name: &str) -> B256 {
    packed_key(CONTRACT_ABI_PREFIX, name.as_bytes())
}
