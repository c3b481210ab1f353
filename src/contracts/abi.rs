/// Contract ABIs and the compressed-ABI codec
///
/// ABIs stored in RocketStorage (and frozen in the legacy tables) are JSON
/// ABI text, zlib-compressed, then standard base64-encoded. Decoding is
/// all-or-nothing: any failing stage yields `RegistryError::Decode`.
use crate::error::{RegistryError, Result};
use alloy::json_abi::JsonAbi;
use alloy::sol;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// ABI of the version interface every network contract inherits
const VERSION_ABI_JSON: &str = r#"[
    {
        "inputs": [],
        "name": "version",
        "outputs": [
            {
                "internalType": "uint8",
                "name": "",
                "type": "uint8"
            }
        ],
        "stateMutability": "view",
        "type": "function"
    }
]"#;

/// Decode an encoded ABI blob into a parsed ABI
pub fn decode_abi(encoded: &str) -> Result<JsonAbi> {
    let compressed = BASE64
        .decode(encoded.trim())
        .map_err(|e| RegistryError::Decode(format!("invalid base64: {e}")))?;

    let mut json = String::new();
    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    decoder
        .read_to_string(&mut json)
        .map_err(|e| RegistryError::Decode(format!("decompression failed: {e}")))?;
    // The zlib stream must span the whole blob
    if decoder.total_in() != compressed.len() as u64 {
        return Err(RegistryError::Decode(format!(
            "decompression failed: {} trailing bytes after zlib stream",
            compressed.len() as u64 - decoder.total_in()
        )));
    }

    serde_json::from_str(&json)
        .map_err(|e| RegistryError::Decode(format!("invalid ABI JSON: {e}")))
}

/// Encode ABI JSON text into the compressed, base64 form
pub fn encode_abi(json: &str) -> Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(json.as_bytes())
        .map_err(|e| RegistryError::Encode(format!("compression failed: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| RegistryError::Encode(format!("compression failed: {e}")))?;

    Ok(BASE64.encode(compressed))
}

/// Encode an already-parsed ABI
pub fn encode_parsed_abi(abi: &JsonAbi) -> Result<String> {
    let json = serde_json::to_string(abi)?;
    encode_abi(&json)
}

/// The statically known `version() -> uint8` interface
pub fn version_abi() -> Result<JsonAbi> {
    serde_json::from_str(VERSION_ABI_JSON)
        .map_err(|e| RegistryError::Decode(format!("invalid version ABI: {e}")))
}

// Solidity definition of the canonical storage contract using alloy's sol! macro
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    RocketStorage,
    r#"[
        {
            "inputs": [
                {
                    "internalType": "bytes32",
                    "name": "_key",
                    "type": "bytes32"
                }
            ],
            "name": "getAddress",
            "outputs": [
                {
                    "internalType": "address",
                    "name": "",
                    "type": "address"
                }
            ],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {
                    "internalType": "bytes32",
                    "name": "_key",
                    "type": "bytes32"
                }
            ],
            "name": "getString",
            "outputs": [
                {
                    "internalType": "string",
                    "name": "",
                    "type": "string"
                }
            ],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#
}

#[cfg(test)]
mod tests {
    use super::*;

    // zlib + base64 of [{"name":"version",...}] produced by the reference encoder
    const VERSION_ONLY_BLOB: &str = "eJyLrlbKzCsoLSlWsoqO1VHKS8xNVbJSKkstKs7Mz1PSUcovLYHKghSWpBblJeaEVBaAFJUC+RZKcD1AVgmyRC3QuOKSxJJU39KSxKTMnMySSpDJmanlCJVppXnJJSCLamMBipoukQ==";

    #[test]
    fn test_decode_reference_blob() {
        let abi = decode_abi(VERSION_ONLY_BLOB).unwrap();
        let functions = abi.function("version").unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].outputs[0].ty, "uint8");
    }

    #[test]
    fn test_round_trip_matches_direct_parse() {
        let encoded = encode_abi(VERSION_ABI_JSON).unwrap();
        let decoded = decode_abi(&encoded).unwrap();
        let direct: JsonAbi = serde_json::from_str(VERSION_ABI_JSON).unwrap();
        assert_eq!(decoded, direct);
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let encoded = format!("  {VERSION_ONLY_BLOB}\n");
        assert!(decode_abi(&encoded).is_ok());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_abi("not base64 !!").unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_decode_rejects_uncompressed_payload() {
        // "hello" in base64, never zlib-compressed
        let err = decode_abi("aGVsbG8=").unwrap_err();
        assert!(err.to_string().contains("decompression failed"));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(VERSION_ABI_JSON.as_bytes()).unwrap();
        let mut compressed = encoder.finish().unwrap();
        assert!(decode_abi(&BASE64.encode(&compressed)).is_ok());

        compressed.extend_from_slice(b"GARBAGE");
        let err = decode_abi(&BASE64.encode(&compressed)).unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));
        assert!(err.to_string().contains("7 trailing bytes"));
    }

    #[test]
    fn test_version_abi_has_single_method() {
        let abi = version_abi().unwrap();
        assert_eq!(abi.functions().count(), 1);
        assert!(abi.function("version").is_some());
    }
}
