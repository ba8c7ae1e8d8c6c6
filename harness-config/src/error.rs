//! Configuration errors.

use harness_wallet::WalletError;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Offending path.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Requested network is not configured.
    #[error("Unknown network '{name}' (configured: {available})")]
    UnknownNetwork {
        /// Requested name.
        name: String,
        /// Comma-separated configured names.
        available: String,
    },

    /// A value failed validation.
    #[error("Invalid value for {field}: {message}")]
    Invalid {
        /// Field path.
        field: String,
        /// What is wrong.
        message: String,
    },

    /// Wallet list has no entry at the requested index.
    #[error("No wallet configured at index {index} ({count} available)")]
    MissingWallet {
        /// Requested index.
        index: usize,
        /// Number of wallets configured.
        count: usize,
    },

    /// Wallet entry could not be turned into a keypair.
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
