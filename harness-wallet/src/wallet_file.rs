//! Wallet files listing the default actors of a scenario.
//!
//! ```json
//! { "defaultWallets": [ { "publicKey": "ak_...", "secretKey": "<hex>" } ] }
//! ```

use crate::error::{WalletError, WalletResult};
use crate::keypair::Keypair;
use harness_primitives::AccountAddress;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One serialized keypair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypairEntry {
    pub public_key: AccountAddress,
    #[serde(alias = "privateKey")]
    pub secret_key: String,
}

impl KeypairEntry {
    /// Serializable form of `keypair`.
    #[must_use]
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            public_key: *keypair.address(),
            secret_key: keypair.secret_hex(),
        }
    }

    /// Parses the secret and checks that it derives the stated public key.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::KeyMismatch` when the halves disagree.
    pub fn to_keypair(&self) -> WalletResult<Keypair> {
        let keypair = Keypair::from_secret_hex(&self.secret_key)?;
        if keypair.address() != &self.public_key {
            return Err(WalletError::KeyMismatch {
                expected: self.public_key.to_string(),
                derived: keypair.address().to_string(),
            });
        }
        Ok(keypair)
    }
}

/// Ordered list of default keypairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletFile {
    #[serde(default)]
    pub default_wallets: Vec<KeypairEntry>,
}

impl WalletFile {
    /// Parses JSON text.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::File` on malformed JSON.
    pub fn from_json(text: &str, origin: &str) -> WalletResult<Self> {
        serde_json::from_str(text).map_err(|e| WalletError::File {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Reads and parses a wallet file.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::File` when the file cannot be read or parsed.
    pub fn load(path: &Path) -> WalletResult<Self> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| WalletError::File {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&text, &origin)
    }

    /// All keypairs, in file order.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that does not parse or is inconsistent.
    pub fn keypairs(&self) -> WalletResult<Vec<Keypair>> {
        self.default_wallets
            .iter()
            .map(KeypairEntry::to_keypair)
            .collect()
    }
}
