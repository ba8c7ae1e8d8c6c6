//! Error types for node and compiler transports.

use crate::models::CompilerMessage;
use harness_primitives::PrimitiveError;
use harness_wallet::WalletError;
use thiserror::Error;

/// JSON-RPC error codes used by the node.
pub mod codes {
    /// Malformed JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Unknown method.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Wrong or malformed parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Node-side failure.
    pub const INTERNAL_ERROR: i64 = -32603;
    /// `getaccount` for an account that never received a transaction.
    pub const UNKNOWN_ACCOUNT: i64 = -32004;
    /// `getcontract` / `getcontractcode` for an unknown address.
    pub const UNKNOWN_CONTRACT: i64 = -32005;
    /// `gettransactioninfo` for a hash the node never saw.
    pub const UNKNOWN_TRANSACTION: i64 = -32006;
    /// Nonce is not the next one for the signer.
    pub const INVALID_NONCE: i64 = -32010;
    /// Signature does not verify for the signer.
    pub const INVALID_SIGNATURE: i64 = -32011;
    /// Transaction rejected for another reason.
    pub const TX_REJECTED: i64 = -32012;
}

/// Errors that can occur while talking to the node or the compiler.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Connection or HTTP-level failure.
    #[error("Request to {endpoint} failed: {message}")]
    Http {
        /// Method or endpoint name.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// Request or wait exceeded its deadline.
    #[error("Timed out waiting for {operation}")]
    Timeout {
        /// What was being waited for.
        operation: String,
    },

    /// The node answered with a JSON-RPC error.
    #[error("Node error {code}: {message}")]
    Server {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The compiler rejected the source.
    #[error("Compilation failed: {}", join_messages(.messages))]
    Compile {
        /// Compiler diagnostics, verbatim.
        messages: Vec<CompilerMessage>,
    },

    /// A response did not have the documented shape.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },

    /// A request could not be built from the given arguments.
    #[error("Invalid parameters: {message}")]
    InvalidParams {
        /// Error message.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Address or payload decoding error.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// Signing or verification error.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl RpcError {
    /// Create an HTTP error.
    pub fn http<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a server error.
    pub fn server<S: Into<String>>(code: i64, message: S) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create an invalid params error.
    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// JSON-RPC code carried by this error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the node refused a request (as opposed to the transport failing).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    pub(crate) fn from_reqwest(endpoint: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(endpoint)
        } else {
            Self::http(endpoint, err.to_string())
        }
    }
}

fn join_messages(messages: &[CompilerMessage]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for transport operations.
pub type RpcResult<T> = std::result::Result<T, RpcError>;
