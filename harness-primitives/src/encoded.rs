//! Variable-length prefixed payloads (`cb_`, `tx_`).

use crate::encoding::Prefix;
use crate::error::PrimitiveResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque byte payload carried with its prefix.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedBytes {
    prefix: Prefix,
    bytes: Vec<u8>,
}

impl EncodedBytes {
    /// Wraps bytes under `prefix`.
    #[must_use]
    pub fn new(prefix: Prefix, bytes: Vec<u8>) -> Self {
        Self { prefix, bytes }
    }

    /// Contract bytearray (`cb_`): bytecode, calldata or a return value.
    #[must_use]
    pub fn bytearray(bytes: Vec<u8>) -> Self {
        Self::new(Prefix::Bytearray, bytes)
    }

    /// Parses `input`, requiring the given prefix.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError` on prefix, encoding or checksum failure.
    pub fn parse(prefix: Prefix, input: &str) -> PrimitiveResult<Self> {
        Ok(Self {
            prefix,
            bytes: prefix.decode(input.trim())?,
        })
    }

    /// Prefix of this payload.
    #[must_use]
    pub const fn prefix(&self) -> Prefix {
        self.prefix
    }

    /// Decoded payload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// String form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.prefix.encode(&self.bytes)
    }
}

impl fmt::Display for EncodedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for EncodedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedBytes({}_, {} bytes)", self.prefix, self.bytes.len())
    }
}

impl Serialize for EncodedBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for EncodedBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let prefix = match s.get(..3) {
            Some("cb_") => Prefix::Bytearray,
            Some("tx_") => Prefix::Transaction,
            _ => {
                return Err(serde::de::Error::custom(format!(
                    "unsupported payload prefix in '{s}'"
                )))
            }
        };
        Self::parse(prefix, &s).map_err(serde::de::Error::custom)
    }
}
