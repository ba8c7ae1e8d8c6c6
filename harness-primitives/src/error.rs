//! Error types for primitive parsing.

use thiserror::Error;

/// Errors raised while decoding prefixed identifiers and payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// The string does not start with the expected prefix.
    #[error("Invalid prefix: expected '{expected}_', got '{actual}'")]
    InvalidPrefix {
        /// Expected prefix without the underscore.
        expected: &'static str,
        /// What the input actually started with.
        actual: String,
    },

    /// The body is not valid base58/base64.
    #[error("Invalid encoding: {message}")]
    InvalidEncoding {
        /// Error message.
        message: String,
    },

    /// Checksum mismatch.
    #[error("Checksum mismatch for '{input}'")]
    ChecksumMismatch {
        /// The offending input.
        input: String,
    },

    /// Decoded payload has the wrong size.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
}

impl PrimitiveError {
    /// Create an invalid encoding error.
    pub fn invalid_encoding<S: Into<String>>(message: S) -> Self {
        Self::InvalidEncoding {
            message: message.into(),
        }
    }
}

/// Result type for primitive operations.
pub type PrimitiveResult<T> = std::result::Result<T, PrimitiveError>;
