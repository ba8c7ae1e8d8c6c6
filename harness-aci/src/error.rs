//! Errors for ACI parsing and value conversion.

use thiserror::Error;

/// Errors raised while reading an ACI or converting values against it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AciError {
    /// Malformed ACI document.
    #[error("Invalid ACI: {message}")]
    InvalidAci {
        /// Error message.
        message: String,
    },

    /// Type expression could not be parsed.
    #[error("Invalid type '{input}': {message}")]
    InvalidType {
        /// The offending type text.
        input: String,
        /// Parser message.
        message: String,
    },

    /// Source literal could not be parsed.
    #[error("Invalid literal '{input}': {message}")]
    InvalidLiteral {
        /// The offending literal text.
        input: String,
        /// Parser message.
        message: String,
    },

    /// A JSON value does not have the shape of the expected type.
    #[error("Cannot decode {found} as {expected}")]
    TypeMismatch {
        /// Expected type, rendered in source syntax.
        expected: String,
        /// Short description of what was found.
        found: String,
    },

    /// A typed value could not be converted to the requested Rust type.
    #[error("Cannot convert {value} into {target}")]
    Conversion {
        /// Rendered value.
        value: String,
        /// Target Rust type.
        target: &'static str,
    },

    /// Wrong number of arguments for an entry point.
    #[error("Entrypoint '{function}' takes {expected} argument(s), got {found}")]
    Arity {
        /// Entry point name.
        function: String,
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// Entry point is not part of the interface.
    #[error("Unknown entrypoint '{name}' on contract {contract}")]
    UnknownFunction {
        /// Contract name.
        contract: String,
        /// Requested entry point.
        name: String,
    },

    /// Type is named but no definition is available.
    #[error("Unresolved type '{name}'")]
    Unresolved {
        /// The type name.
        name: String,
    },
}

impl AciError {
    /// Create an invalid ACI error.
    pub fn invalid_aci<S: Into<String>>(message: S) -> Self {
        Self::InvalidAci {
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn mismatch<E: ToString, F: Into<String>>(expected: &E, found: F) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}

/// Result type for ACI operations.
pub type AciResult<T> = std::result::Result<T, AciError>;
