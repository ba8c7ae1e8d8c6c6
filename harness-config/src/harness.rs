//! Top-level harness configuration: networks plus default wallets.

use crate::error::{ConfigError, ConfigResult};
use crate::network::{NetworkConfig, NetworkMap, DEFAULT_NETWORK};
use harness_wallet::{Keypair, WalletFile};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Environment variable selecting the active network.
pub const NETWORK_ENV: &str = "HARNESS_NETWORK";

/// Networks and wallets, passed explicitly into session construction.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    networks: NetworkMap,
    wallets: WalletFile,
}

impl HarnessConfig {
    /// Builds a validated configuration from already-parsed parts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a network entry fails validation.
    pub fn from_parts(networks: NetworkMap, wallets: WalletFile) -> ConfigResult<Self> {
        for (name, network) in &networks {
            network.validate(name)?;
        }
        Ok(Self { networks, wallets })
    }

    /// Loads the network file and the wallet file. Paths ending in `.toml`
    /// are parsed as TOML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when either file is unreadable, malformed or
    /// fails validation.
    pub fn load(network_path: &Path, wallet_path: &Path) -> ConfigResult<Self> {
        let networks: NetworkMap = parse_file(network_path)?;
        let wallets: WalletFile = parse_file(wallet_path)?;
        debug!(
            networks = networks.len(),
            wallets = wallets.default_wallets.len(),
            "loaded harness configuration"
        );
        Self::from_parts(networks, wallets)
    }

    /// Configured networks.
    #[must_use]
    pub const fn networks(&self) -> &NetworkMap {
        &self.networks
    }

    /// Looks up a network by logical name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownNetwork` when absent.
    pub fn network(&self, name: &str) -> ConfigResult<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                available: self.networks.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    /// The network named by `HARNESS_NETWORK`, else `local`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownNetwork` when the selected name is absent.
    pub fn select_network(&self) -> ConfigResult<(String, &NetworkConfig)> {
        let name = network_name_from(std::env::var(NETWORK_ENV).ok());
        let network = self.network(&name)?;
        Ok((name, network))
    }

    /// Keypair of the actor at `index` in wallet order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingWallet` for an out-of-range index and
    /// `ConfigError::Wallet` for an inconsistent entry.
    pub fn keypair(&self, index: usize) -> ConfigResult<Keypair> {
        let entry = self
            .wallets
            .default_wallets
            .get(index)
            .ok_or(ConfigError::MissingWallet {
                index,
                count: self.wallets.default_wallets.len(),
            })?;
        Ok(entry.to_keypair()?)
    }

    /// All actor keypairs in wallet order.
    ///
    /// # Errors
    ///
    /// Fails on the first inconsistent entry.
    pub fn keypairs(&self) -> ConfigResult<Vec<Keypair>> {
        Ok(self.wallets.keypairs()?)
    }
}

/// Resolves the selected network name from an optional override.
#[must_use]
pub fn network_name_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_NETWORK.to_string())
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: display,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_name_defaults_to_local() {
        assert_eq!(network_name_from(None), "local");
        assert_eq!(network_name_from(Some("  ".into())), "local");
        assert_eq!(network_name_from(Some("testnet".into())), "testnet");
    }

    #[test]
    fn unknown_network_lists_available() {
        let cfg = HarnessConfig::from_parts(NetworkMap::new(), WalletFile::default()).unwrap();
        let err = cfg.network("local").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork { .. }));
    }

    #[test]
    fn missing_wallet_reports_count() {
        let cfg = HarnessConfig::from_parts(NetworkMap::new(), WalletFile::default()).unwrap();
        match cfg.keypair(1) {
            Err(ConfigError::MissingWallet { index, count }) => {
                assert_eq!(index, 1);
                assert_eq!(count, 0);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
