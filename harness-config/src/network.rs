//! Named network environments.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Network used when nothing else is selected.
pub const DEFAULT_NETWORK: &str = "local";

/// Network id signed into every transaction unless overridden.
pub const DEFAULT_NETWORK_ID: &str = "ae_devnet";

/// Endpoints and transport settings of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Node RPC endpoint.
    pub node_url: Url,

    /// Compiler service endpoint.
    pub compiler_url: Url,

    /// Network id mixed into transaction signatures.
    #[serde(default = "default_network_id")]
    pub network_id: String,

    /// Per-request HTTP timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Delay between transaction inclusion polls in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Polls before a pending transaction counts as timed out.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_network_id() -> String {
    DEFAULT_NETWORK_ID.to_string()
}

const fn default_request_timeout() -> u64 {
    30_000
}

const fn default_poll_interval() -> u64 {
    500
}

const fn default_max_poll_attempts() -> u32 {
    40
}

impl NetworkConfig {
    /// Configuration with default transport settings.
    #[must_use]
    pub fn new(node_url: Url, compiler_url: Url) -> Self {
        Self {
            node_url,
            compiler_url,
            network_id: default_network_id(),
            request_timeout_ms: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Delay between inclusion polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        for (field, url) in [("nodeUrl", &self.node_url), ("compilerUrl", &self.compiler_url)] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::invalid(
                    format!("{name}.{field}"),
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            }
        }
        if self.network_id.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("{name}.networkId"),
                "must not be empty",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                format!("{name}.requestTimeoutMs"),
                "must be greater than zero",
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::invalid(
                format!("{name}.maxPollAttempts"),
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Logical name -> network settings.
pub type NetworkMap = BTreeMap<String, NetworkConfig>;
