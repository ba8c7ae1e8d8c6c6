use harness_primitives::PrimitiveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] PrimitiveError),

    #[error("public key {expected} does not match secret key (derives {derived})")]
    KeyMismatch { expected: String, derived: String },

    #[error("signature verification failed")]
    BadSignature,

    #[error("wallet file {path}: {message}")]
    File { path: String, message: String },
}

pub type WalletResult<T> = std::result::Result<T, WalletError>;
