//! Execution failures inside the devnet.

use harness_rpc::ReturnType;
use thiserror::Error;

/// Why a contract call did not return normally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The contract aborted with a message.
    #[error("revert: {0}")]
    Revert(String),

    /// The call could not run: bad calldata, unknown function, out of gas.
    #[error("error: {0}")]
    Error(String),
}

impl ExecError {
    pub fn revert<S: Into<String>>(message: S) -> Self {
        Self::Revert(message.into())
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::Error(message.into())
    }

    /// Return type recorded in the call info.
    #[must_use]
    pub const fn return_type(&self) -> ReturnType {
        match self {
            Self::Revert(_) => ReturnType::Revert,
            Self::Error(_) => ReturnType::Error,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Revert(message) | Self::Error(message) => message,
        }
    }
}

/// Result of executing contract code.
pub type ExecResult<T> = std::result::Result<T, ExecError>;
