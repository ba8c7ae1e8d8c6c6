//! Scenario runner for the contract harness.
//!
//! A scenario is a list of named async steps run strictly in order by
//! [`ScenarioRunner`]. Steps assert with [`expect_eq`], [`expect_true`] and
//! [`expect_revert`]; the first failure stops the run and the outcome of
//! every step lands in a [`ScenarioReport`].
//!
//! [`NftScenario`] is the NFT ownership walkthrough. Tests run it against the
//! in-process devnet; with `config/network.json` and `config/wallets.json`
//! it runs against a live node and compiler.

pub mod assert;
pub mod error;
pub mod nft;
pub mod runner;

pub use assert::{expect_eq, expect_revert, expect_true};
pub use error::{ScenarioError, ScenarioResult};
pub use nft::NftScenario;
pub use runner::{ScenarioReport, ScenarioRunner, StepOutcome, StepReport};
