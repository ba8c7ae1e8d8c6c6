//! Client SDK of the contract harness.
//!
//! The workflow is: load a contract source with its includes
//! ([`ContractArtifact`]), compile it through a [`ClientSession`], deploy or
//! bind it as a [`ContractInstance`], then call entry points. The session's
//! keypair signs every transaction.
//!
//! ```no_run
//! use harness_config::NetworkConfig;
//! use harness_sdk::{ClientSession, ContractArtifact, Nft};
//! use harness_wallet::Keypair;
//!
//! # async fn run(network: NetworkConfig, owner: Keypair) -> harness_sdk::SdkResult<()> {
//! let session = ClientSession::connect(&network, owner)?;
//! let artifact = ContractArtifact::load("contracts/NFT.aes")?;
//! let nft = Nft::deploy(&session, &artifact, "Test NFT", "TST").await?;
//! nft.mint(session.address(), 0).await?;
//! assert_eq!(nft.owner_of(0).await?, *session.address());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod instance;
pub mod loader;
pub mod nft;
pub mod session;

pub use error::{SdkError, SdkResult};
pub use instance::{CallResult, ContractInstance, DeployInfo};
pub use loader::ContractArtifact;
pub use nft::Nft;
pub use session::{ClientSession, CompiledContract, SessionOptions, TxOutcome};

pub use harness_aci::{args, FromValue, IntoValue, Value};
