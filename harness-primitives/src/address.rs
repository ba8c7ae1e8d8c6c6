//! Fixed-size prefixed identifiers.

use crate::encoding::Prefix;
use crate::error::{PrimitiveError, PrimitiveResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size of account/contract identities and tx hashes in bytes.
pub const ID_SIZE: usize = 32;

/// Size of an ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr, $size:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Byte length of the payload.
            pub const LENGTH: usize = $size;

            /// Wraps raw bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Builds from a slice.
            ///
            /// # Errors
            ///
            /// Returns `PrimitiveError::InvalidLength` when the slice has the wrong size.
            pub fn from_slice(bytes: &[u8]) -> PrimitiveResult<Self> {
                let array: [u8; $size] =
                    bytes
                        .try_into()
                        .map_err(|_| PrimitiveError::InvalidLength {
                            expected: $size,
                            actual: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            /// Raw payload bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// Prefix used in the string form.
            #[must_use]
            pub const fn prefix() -> Prefix {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&$prefix.encode(&self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = $prefix.decode(s.trim())?;
                Self::from_slice(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

prefixed_id!(
    /// Account identity (`ak_`), the ed25519 public key of a signer.
    AccountAddress,
    Prefix::Account,
    ID_SIZE
);

prefixed_id!(
    /// Contract identity (`ct_`).
    ContractAddress,
    Prefix::Contract,
    ID_SIZE
);

prefixed_id!(
    /// Transaction hash (`th_`).
    TxHash,
    Prefix::TxHash,
    ID_SIZE
);

prefixed_id!(
    /// Detached ed25519 signature (`sg_`).
    Signature,
    Prefix::Signature,
    SIGNATURE_SIZE
);

impl ContractAddress {
    /// The same identity typed as an account.
    ///
    /// Entry points that take an `address` argument need this form when the
    /// recipient is itself a contract.
    #[must_use]
    pub const fn as_account(&self) -> AccountAddress {
        AccountAddress(self.0)
    }
}

impl AccountAddress {
    /// Reinterprets an account-typed identity as a contract identity.
    #[must_use]
    pub const fn as_contract(&self) -> ContractAddress {
        ContractAddress(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_address_display_parse() {
        let addr = AccountAddress::from_bytes([9u8; 32]);
        let text = addr.to_string();
        assert!(text.starts_with("ak_"));
        assert_eq!(text.parse::<AccountAddress>().unwrap(), addr);
    }

    #[test]
    fn contract_to_account_keeps_payload() {
        let ct = ContractAddress::from_bytes([3u8; 32]);
        let ak = ct.as_account();
        assert_eq!(ak.as_bytes(), ct.as_bytes());
        assert_eq!(&ak.to_string()[3..], &ct.to_string()[3..]);
        assert_eq!(ak.as_contract(), ct);
    }

    #[test]
    fn parse_rejects_contract_as_account() {
        let ct = ContractAddress::from_bytes([3u8; 32]).to_string();
        assert!(ct.parse::<AccountAddress>().is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let hash = TxHash::from_bytes([5u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn from_slice_checks_length() {
        assert_eq!(
            Signature::from_slice(&[0u8; 10]).unwrap_err(),
            PrimitiveError::InvalidLength {
                expected: 64,
                actual: 10
            }
        );
    }
}
