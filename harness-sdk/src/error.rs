//! Error taxonomy of the client SDK.

use harness_aci::AciError;
use harness_primitives::ContractAddress;
use harness_rpc::{CompilerMessage, RpcError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to harness steps.
#[derive(Error, Debug)]
pub enum SdkError {
    /// A source or include file could not be read.
    #[error("Cannot load {}{}: {message}", .path.display(), includer_suffix(.includer))]
    Load {
        /// The missing or unreadable file.
        path: PathBuf,
        /// File whose include directive named it.
        includer: Option<PathBuf>,
        /// Underlying reason.
        message: String,
    },

    /// The compiler rejected the source.
    #[error("Compilation failed: {}", join(.messages))]
    Compile {
        /// Compiler diagnostics, verbatim.
        messages: Vec<CompilerMessage>,
    },

    /// Deployment failed or was attempted twice.
    #[error("Deploy failed: {message}")]
    Deploy {
        /// Revert message or reason.
        message: String,
    },

    /// An address could not be bound to the artifact.
    #[error("Cannot bind {address}: {message}")]
    Bind {
        /// Requested contract address.
        address: ContractAddress,
        /// Reason.
        message: String,
    },

    /// An entry point reverted or the VM failed.
    #[error("Call to '{entrypoint}' failed: {message}")]
    Call {
        /// Entry point name.
        entrypoint: String,
        /// Contract abort message.
        message: String,
    },

    /// Network failure, timeout or malformed response.
    #[error("Transport error: {0}")]
    Transport(#[source] RpcError),

    /// The node refused a request.
    #[error("Node rejected request ({code}): {message}")]
    Node {
        /// JSON-RPC error code.
        code: i64,
        /// Node message.
        message: String,
    },

    /// Unknown entry point or arguments that do not fit the interface.
    #[error("Interface mismatch: {0}")]
    Interface(#[source] AciError),

    /// A result does not match the declared return type.
    #[error("Cannot decode result of '{entrypoint}': {source}")]
    Decode {
        /// Entry point name.
        entrypoint: String,
        /// Decoding failure.
        #[source]
        source: AciError,
    },
}

impl SdkError {
    /// Create a load error for a top-level file.
    pub fn load<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Load {
            path: path.into(),
            includer: None,
            message: message.into(),
        }
    }

    /// Create a deploy error.
    pub fn deploy<S: Into<String>>(message: S) -> Self {
        Self::Deploy {
            message: message.into(),
        }
    }

    /// Create a call error.
    pub fn call<E: Into<String>, S: Into<String>>(entrypoint: E, message: S) -> Self {
        Self::Call {
            entrypoint: entrypoint.into(),
            message: message.into(),
        }
    }

    /// Create an interface error from a plain message.
    pub fn interface<S: Into<String>>(message: S) -> Self {
        Self::Interface(AciError::invalid_aci(message))
    }

    /// The contract's abort message, for call and constructor reverts.
    #[must_use]
    pub fn revert_message(&self) -> Option<&str> {
        match self {
            Self::Call { message, .. } | Self::Deploy { message } => Some(message),
            _ => None,
        }
    }

    /// Whether this is a revert whose message contains `needle`.
    #[must_use]
    pub fn is_revert_containing(&self, needle: &str) -> bool {
        self.revert_message().is_some_and(|m| m.contains(needle))
    }

    /// Whether the transport gave up waiting.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(RpcError::Timeout { .. }))
    }
}

impl From<RpcError> for SdkError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Server { code, message } => Self::Node { code, message },
            RpcError::Compile { messages } => Self::Compile { messages },
            other => Self::Transport(other),
        }
    }
}

fn includer_suffix(includer: &Option<PathBuf>) -> String {
    includer
        .as_ref()
        .map(|p| format!(" (included from {})", p.display()))
        .unwrap_or_default()
}

fn join(messages: &[CompilerMessage]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for SDK operations.
pub type SdkResult<T> = std::result::Result<T, SdkError>;
