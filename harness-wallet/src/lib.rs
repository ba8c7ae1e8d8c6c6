//! Signing keypairs for harness actors.
//!
//! Every transaction the harness submits is signed with the keypair of the
//! session that sent it; signing is the only authorization mechanism.

mod error;
pub mod keypair;
pub mod wallet_file;

pub use error::{WalletError, WalletResult};
pub use keypair::{verify, Keypair};
pub use wallet_file::{KeypairEntry, WalletFile};
