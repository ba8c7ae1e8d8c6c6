//! Prefixed check-encodings.
//!
//! Every identifier travelling between the harness, the node and the compiler
//! is a two-letter prefix, an underscore, and the payload followed by a
//! four-byte checksum (first bytes of double SHA-256) in either base58 or
//! base64.

use crate::error::{PrimitiveError, PrimitiveResult};
use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of checksum bytes appended to every payload.
pub const CHECKSUM_SIZE: usize = 4;

/// Body encoding of a prefixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Bitcoin-alphabet base58.
    Base58,
    /// Standard base64 with padding.
    Base64,
}

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// Account public key.
    Account,
    /// Contract identity.
    Contract,
    /// Transaction hash.
    TxHash,
    /// Transaction signature.
    Signature,
    /// Contract bytearray: bytecode, calldata, return values.
    Bytearray,
    /// Serialized signed transaction.
    Transaction,
}

impl Prefix {
    /// The two-letter tag, without underscore.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Account => "ak",
            Self::Contract => "ct",
            Self::TxHash => "th",
            Self::Signature => "sg",
            Self::Bytearray => "cb",
            Self::Transaction => "tx",
        }
    }

    /// Body encoding used for this prefix.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        match self {
            Self::Account | Self::Contract | Self::TxHash | Self::Signature => Encoding::Base58,
            Self::Bytearray | Self::Transaction => Encoding::Base64,
        }
    }

    /// Encodes `payload` as `<tag>_<body>`.
    #[must_use]
    pub fn encode(&self, payload: &[u8]) -> String {
        let mut data = Vec::with_capacity(payload.len() + CHECKSUM_SIZE);
        data.extend_from_slice(payload);
        data.extend_from_slice(&checksum(payload));

        let body = match self.encoding() {
            Encoding::Base58 => bs58::encode(&data).into_string(),
            Encoding::Base64 => general_purpose::STANDARD.encode(&data),
        };
        format!("{}_{}", self.tag(), body)
    }

    /// Decodes a `<tag>_<body>` string, verifying prefix and checksum.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError` when the prefix, body encoding or checksum
    /// is wrong.
    pub fn decode(&self, input: &str) -> PrimitiveResult<Vec<u8>> {
        let body = match input.split_once('_') {
            Some((tag, body)) if tag == self.tag() => body,
            Some((tag, _)) => {
                return Err(PrimitiveError::InvalidPrefix {
                    expected: self.tag(),
                    actual: tag.to_string(),
                })
            }
            None => {
                return Err(PrimitiveError::InvalidPrefix {
                    expected: self.tag(),
                    actual: input.chars().take(2).collect(),
                })
            }
        };

        let data = match self.encoding() {
            Encoding::Base58 => bs58::decode(body)
                .into_vec()
                .map_err(|e| PrimitiveError::invalid_encoding(e.to_string()))?,
            Encoding::Base64 => general_purpose::STANDARD
                .decode(body)
                .map_err(|e| PrimitiveError::invalid_encoding(e.to_string()))?,
        };

        if data.len() < CHECKSUM_SIZE {
            return Err(PrimitiveError::InvalidLength {
                expected: CHECKSUM_SIZE,
                actual: data.len(),
            });
        }

        let (payload, check) = data.split_at(data.len() - CHECKSUM_SIZE);
        if checksum(payload) != check {
            return Err(PrimitiveError::ChecksumMismatch {
                input: input.to_string(),
            });
        }
        Ok(payload.to_vec())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// SHA-256 digest of `data`.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Four-byte double SHA-256 checksum.
#[must_use]
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let twice = sha256(&sha256(payload));
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&twice[..CHECKSUM_SIZE]);
    out
}
