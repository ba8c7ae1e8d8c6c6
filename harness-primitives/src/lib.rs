//! # Harness Primitives
//!
//! Fundamental types shared by every crate of the contract harness:
//! - `AccountAddress` (`ak_`), `ContractAddress` (`ct_`): 32-byte identities
//! - `TxHash` (`th_`), `Signature` (`sg_`)
//! - `EncodedBytes`: prefixed base64check payloads (`cb_` bytecode and
//!   calldata, `tx_` transactions)
//!
//! ## Example
//!
//! ```rust
//! use harness_primitives::{AccountAddress, ContractAddress};
//!
//! let contract = ContractAddress::from_bytes([7u8; 32]);
//! let as_account: AccountAddress = contract.as_account();
//! assert!(as_account.to_string().starts_with("ak_"));
//! assert_eq!(as_account.as_bytes(), contract.as_bytes());
//! ```

pub mod address;
pub mod encoded;
pub mod encoding;
pub mod error;

pub use address::{AccountAddress, ContractAddress, Signature, TxHash, ID_SIZE, SIGNATURE_SIZE};
pub use encoded::EncodedBytes;
pub use encoding::{checksum, sha256, Encoding, Prefix};
pub use error::{PrimitiveError, PrimitiveResult};
