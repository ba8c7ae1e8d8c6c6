//! Byte formats shared by the devnet compiler and node.
//!
//! Bytecode, calldata and return values are all `cb_` byte arrays holding
//! JSON. Bytecode records which contract was compiled and from what source,
//! so the node can pick the matching emulation and two compilations of the
//! same source are byte-identical.

use crate::error::{ExecError, ExecResult};
use harness_aci::Value;
use harness_primitives::{sha256, EncodedBytes, Prefix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version string reported by the devnet compiler and stamped into bytecode.
pub const DEVNET_COMPILER_VERSION: &str = "8.0.0-devnet";

/// Devnet bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytecode {
    pub compiler_version: String,
    /// Main contract name.
    pub contract: String,
    /// Hex SHA-256 over the source and its include files.
    pub source_hash: String,
}

impl Bytecode {
    #[must_use]
    pub fn new(contract: &str, code: &str, file_system: &BTreeMap<String, String>) -> Self {
        let mut hashed = code.as_bytes().to_vec();
        for (path, text) in file_system {
            hashed.push(0);
            hashed.extend_from_slice(path.as_bytes());
            hashed.push(0);
            hashed.extend_from_slice(text.as_bytes());
        }
        Self {
            compiler_version: DEVNET_COMPILER_VERSION.to_string(),
            contract: contract.to_string(),
            source_hash: hex::encode(sha256(&hashed)),
        }
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn encode(&self) -> serde_json::Result<EncodedBytes> {
        Ok(EncodedBytes::new(Prefix::Bytearray, serde_json::to_vec(self)?))
    }

    /// # Errors
    ///
    /// `ExecError::Error` for anything that is not devnet bytecode.
    pub fn decode(code: &EncodedBytes) -> ExecResult<Self> {
        decode_bytearray(code, "bytecode")
    }
}

/// Devnet calldata: an entry point name and its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calldata {
    pub function: String,
    pub arguments: Vec<Value>,
}

impl Calldata {
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn encode(&self) -> serde_json::Result<EncodedBytes> {
        Ok(EncodedBytes::new(Prefix::Bytearray, serde_json::to_vec(self)?))
    }

    /// # Errors
    ///
    /// `ExecError::Error` for malformed calldata.
    pub fn decode(data: &EncodedBytes) -> ExecResult<Self> {
        decode_bytearray(data, "calldata")
    }
}

/// Encodes a call's return value; reverts carry their message as a string.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn encode_value(value: &Value) -> serde_json::Result<EncodedBytes> {
    Ok(EncodedBytes::new(Prefix::Bytearray, serde_json::to_vec(value)?))
}

/// # Errors
///
/// `ExecError::Error` when `data` does not hold an encoded value.
pub fn decode_value(data: &EncodedBytes) -> ExecResult<Value> {
    decode_bytearray(data, "return value")
}

fn decode_bytearray<T: serde::de::DeserializeOwned>(
    data: &EncodedBytes,
    what: &str,
) -> ExecResult<T> {
    if data.prefix() != Prefix::Bytearray {
        return Err(ExecError::error(format!(
            "{what} must be a cb_ byte array, got {}_",
            data.prefix()
        )));
    }
    serde_json::from_slice(data.as_bytes())
        .map_err(|e| ExecError::error(format!("malformed {what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_primitives::AccountAddress;

    #[test]
    fn bytecode_is_deterministic_and_source_sensitive() {
        let fs = BTreeMap::new();
        let a = Bytecode::new("NFT", "contract NFT =", &fs).encode().unwrap();
        let b = Bytecode::new("NFT", "contract NFT =", &fs).encode().unwrap();
        let c = Bytecode::new("NFT", "contract NFT = // v2", &fs).encode().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(Bytecode::decode(&a).unwrap().contract, "NFT");
    }

    #[test]
    fn calldata_keeps_typed_arguments() {
        let calldata = Calldata {
            function: "mint".into(),
            arguments: vec![
                Value::Address(AccountAddress::from_bytes([3u8; 32])),
                Value::int(0),
            ],
        };
        let decoded = Calldata::decode(&calldata.encode().unwrap()).unwrap();
        assert_eq!(decoded, calldata);
    }

    #[test]
    fn transaction_payload_is_not_calldata() {
        let tx = EncodedBytes::new(Prefix::Transaction, b"{}".to_vec());
        assert!(matches!(Calldata::decode(&tx), Err(ExecError::Error(_))));
    }
}
