//! The NFT ownership scenario.
//!
//! Two actors, OWNER (first wallet) and OTHER (second wallet), drive an
//! NFT contract and a receiver contract through the ownership state
//! machine: unminted, owned, approved, owned by someone else, burned.
//! [`NftScenario::seed`] replays the literal walkthrough on one token;
//! [`NftScenario::properties`] checks each transition rule on a fresh
//! deployment.

use crate::assert::{expect_eq, expect_revert, expect_true};
use crate::error::{ScenarioError, ScenarioResult};
use crate::runner::{ScenarioReport, ScenarioRunner};
use harness_config::{HarnessConfig, NetworkConfig};
use harness_primitives::AccountAddress;
use harness_sdk::{args, ClientSession, ContractArtifact, ContractInstance, Nft};
use std::path::Path;
use tracing::info;

/// NFT contract source, relative to the contracts directory.
pub const NFT_CONTRACT: &str = "NFT.aes";
/// Receiver contract source, relative to the contracts directory.
pub const RECEIVER_CONTRACT: &str = "ExampleContract.aes";

pub const TOKEN_NAME: &str = "Test NFT";
pub const TOKEN_SYMBOL: &str = "TST";

/// Abort messages of the NFT contract.
pub mod revert {
    pub const ALREADY_MINTED: &str = "Already minted";
    pub const ONLY_OWNER_CAN_MINT: &str = "Only owner can mint";
    pub const TOKEN_BURNED: &str = "Token burned";
    pub const NOT_APPROVED_OR_OWNER: &str = "Not approved or owner";
}

/// Actors and contract sources of the scenario.
#[derive(Debug, Clone)]
pub struct NftScenario {
    owner: ClientSession,
    other: ClientSession,
    nft: ContractArtifact,
    receiver: ContractArtifact,
}

/// One NFT deployment seen by both actors.
struct Deployment {
    as_owner: Nft,
    as_other: Nft,
}

impl NftScenario {
    #[must_use]
    pub fn new(
        owner: ClientSession,
        other: ClientSession,
        nft: ContractArtifact,
        receiver: ContractArtifact,
    ) -> Self {
        Self {
            owner,
            other,
            nft,
            receiver,
        }
    }

    /// Loads both contracts from `contracts_dir`.
    ///
    /// # Errors
    ///
    /// Load errors for either source or its includes.
    pub fn load(
        owner: ClientSession,
        other: ClientSession,
        contracts_dir: &Path,
    ) -> ScenarioResult<Self> {
        let nft = ContractArtifact::load(contracts_dir.join(NFT_CONTRACT))?;
        let receiver = ContractArtifact::load(contracts_dir.join(RECEIVER_CONTRACT))?;
        Ok(Self::new(owner, other, nft, receiver))
    }

    /// Connects OWNER and OTHER (wallets 0 and 1) to `network`.
    ///
    /// # Errors
    ///
    /// Missing wallets, transport construction and load errors.
    pub fn connect(
        config: &HarnessConfig,
        network: &NetworkConfig,
        contracts_dir: &Path,
    ) -> ScenarioResult<Self> {
        let owner = ClientSession::connect(network, config.keypair(0)?)?;
        let other = ClientSession::connect(network, config.keypair(1)?)?;
        Self::load(owner, other, contracts_dir)
    }

    #[must_use]
    pub const fn owner(&self) -> &ClientSession {
        &self.owner
    }

    #[must_use]
    pub const fn other(&self) -> &ClientSession {
        &self.other
    }

    async fn deploy_nft(&self) -> ScenarioResult<Deployment> {
        let as_owner = Nft::deploy(&self.owner, &self.nft, TOKEN_NAME, TOKEN_SYMBOL).await?;
        let as_other = Nft::at(&self.other, &self.nft, as_owner.address()?).await?;
        Ok(Deployment { as_owner, as_other })
    }

    async fn deploy_receiver(&self) -> ScenarioResult<(ContractInstance, AccountAddress)> {
        let receiver = self.owner.deploy(&self.receiver, args![]).await?;
        let address = receiver
            .address()
            .ok_or_else(|| ScenarioError::assertion("receiver deploy", "an address", "none"))?;
        Ok((receiver, address.as_account()))
    }

    /// The walkthrough on token 0, then a safe transfer of token 1 to the
    /// receiver contract.
    ///
    /// # Errors
    ///
    /// Deployment failures before the first step. Step failures are
    /// reported in the returned [`ScenarioReport`].
    pub async fn seed(&self) -> ScenarioResult<ScenarioReport> {
        let Deployment { as_owner, as_other } = self.deploy_nft().await?;
        let (receiver, receiver_account) = self.deploy_receiver().await?;
        let nft = &as_owner;
        let owner = self.owner.address();
        let other = self.other.address();
        info!(
            target: "harness_scenario",
            nft = %nft.address()?,
            receiver = %receiver_account,
            "seed scenario deployed"
        );

        let report = ScenarioRunner::new("nft seed")
            .step("metadata matches constructor arguments", async {
                expect_eq("name", TOKEN_NAME.to_string(), nft.name().await?)?;
                expect_eq("symbol", TOKEN_SYMBOL.to_string(), nft.symbol().await?)
            })
            .step("token 0 mints only once", async {
                nft.mint(owner, 0).await?;
                expect_revert(
                    "second mint of token 0",
                    nft.mint(owner, 0).await,
                    revert::ALREADY_MINTED,
                )
            })
            .step("OWNER owns token 0", async {
                expect_eq("owner of 0", *owner, nft.owner_of(0).await?)
            })
            .step("OWNER balance is 1", async {
                expect_eq("balance of OWNER", 1, nft.balance_of(owner).await?)
            })
            .step("transfer to OTHER updates balances", async {
                nft.transfer_from(owner, other, 0).await?;
                expect_eq("balance of OWNER", 0, nft.balance_of(owner).await?)?;
                expect_eq("balance of OTHER", 1, nft.balance_of(other).await?)
            })
            .step("OWNER transfers back by approval", async {
                as_other.approve(owner, 0).await?;
                expect_eq("approved on 0", Some(*owner), nft.get_approved(0).await?)?;
                nft.transfer_from(other, owner, 0).await?;
                expect_eq("balance of OWNER", 1, nft.balance_of(owner).await?)?;
                expect_eq("balance of OTHER", 0, nft.balance_of(other).await?)
            })
            .step("OTHER transfers as operator", async {
                nft.set_approval_for_all(other, true).await?;
                expect_true(
                    "OTHER is operator of OWNER",
                    nft.is_approved_for_all(owner, other).await?,
                )?;
                as_other.transfer_from(owner, other, 0).await?;
                expect_eq("balance of OWNER", 0, nft.balance_of(owner).await?)?;
                expect_eq("balance of OTHER", 1, nft.balance_of(other).await?)
            })
            .step("OTHER burns token 0", async {
                as_other.burn(0).await?;
                expect_eq("balance of OTHER", 0, as_other.balance_of(other).await?)
            })
            .step("safe transfer of token 1 to the receiver", async {
                nft.mint(owner, 1).await?;
                nft.safe_transfer_from(owner, &receiver_account, 1, "")
                    .await?;
                expect_eq("owner of 1", receiver_account, nft.owner_of(1).await?)?;
                let received = receiver
                    .call_as::<u64>("received_count", args![])
                    .await?
                    .decoded_result;
                expect_eq("tokens received", 1, received)
            })
            .run()
            .await;
        Ok(report)
    }

    /// One step per transition rule, on a fresh deployment.
    ///
    /// # Errors
    ///
    /// Deployment failures before the first step.
    pub async fn properties(&self) -> ScenarioResult<ScenarioReport> {
        let Deployment { as_owner, as_other } = self.deploy_nft().await?;
        let (_receiver, receiver_account) = self.deploy_receiver().await?;
        // an NFT contract has no on_nft_received, so it refuses tokens
        let refuser = Nft::deploy(&self.owner, &self.nft, "Refuser", "RFS").await?;
        let refuser_account = refuser.address()?.as_account();
        let nft = &as_owner;
        let owner = self.owner.address();
        let other = self.other.address();

        let report = ScenarioRunner::new("nft properties")
            .step("only the deployer mints", async {
                expect_revert(
                    "mint by OTHER",
                    as_other.mint(other, 10).await,
                    revert::ONLY_OWNER_CAN_MINT,
                )
            })
            .step("mint sets owner and balance", async {
                let before = nft.balance_of(owner).await?;
                nft.mint(owner, 11).await?;
                expect_eq("owner of 11", *owner, nft.owner_of(11).await?)?;
                expect_eq("balance of OWNER", before + 1, nft.balance_of(owner).await?)
            })
            .step("transfer moves the token and clears its approval", async {
                nft.approve(other, 11).await?;
                expect_eq("approved on 11", Some(*other), nft.get_approved(11).await?)?;
                let owner_before = nft.balance_of(owner).await?;
                let other_before = nft.balance_of(other).await?;
                nft.transfer_from(owner, other, 11).await?;
                expect_eq("owner of 11", *other, nft.owner_of(11).await?)?;
                expect_eq("approved on 11", None, nft.get_approved(11).await?)?;
                expect_eq("balance of OWNER", owner_before - 1, nft.balance_of(owner).await?)?;
                expect_eq("balance of OTHER", other_before + 1, nft.balance_of(other).await?)
            })
            .step("unapproved caller cannot transfer", async {
                nft.mint(owner, 12).await?;
                expect_revert(
                    "transfer of 12 by OTHER",
                    as_other.transfer_from(owner, other, 12).await,
                    revert::NOT_APPROVED_OR_OWNER,
                )?;
                expect_eq("owner of 12", *owner, nft.owner_of(12).await?)
            })
            .step("approved address can transfer", async {
                nft.approve(other, 12).await?;
                as_other.transfer_from(owner, other, 12).await?;
                expect_eq("owner of 12", *other, nft.owner_of(12).await?)
            })
            .step("operator rights last until revoked", async {
                nft.mint(owner, 13).await?;
                nft.mint(owner, 14).await?;
                nft.set_approval_for_all(other, true).await?;
                as_other.transfer_from(owner, other, 13).await?;
                expect_eq("owner of 13", *other, nft.owner_of(13).await?)?;

                nft.set_approval_for_all(other, false).await?;
                expect_true(
                    "OTHER is no longer operator",
                    !nft.is_approved_for_all(owner, other).await?,
                )?;
                expect_revert(
                    "transfer of 14 after revocation",
                    as_other.transfer_from(owner, other, 14).await,
                    revert::NOT_APPROVED_OR_OWNER,
                )
            })
            .step("burned token is terminal", async {
                let before = nft.balance_of(owner).await?;
                nft.burn(14).await?;
                expect_eq("balance of OWNER", before - 1, nft.balance_of(owner).await?)?;
                expect_revert("owner of 14", nft.owner_of(14).await, revert::TOKEN_BURNED)?;
                expect_revert(
                    "transfer of 14",
                    nft.transfer_from(owner, other, 14).await,
                    revert::TOKEN_BURNED,
                )?;
                expect_revert(
                    "re-mint of 14",
                    nft.mint(owner, 14).await,
                    revert::ALREADY_MINTED,
                )
            })
            .step("safe transfer to a refusing contract fails atomically", async {
                nft.mint(owner, 15).await?;
                let before = nft.balance_of(owner).await?;
                let outcome = nft.safe_transfer_from(owner, &refuser_account, 15, "").await;
                expect_true("safe transfer to refuser failed", outcome.is_err())?;
                expect_eq("owner of 15", *owner, nft.owner_of(15).await?)?;
                expect_eq("balance of OWNER", before, nft.balance_of(owner).await?)?;
                expect_eq("balance of refuser", 0, nft.balance_of(&refuser_account).await?)
            })
            .step("safe transfer to an accepting contract", async {
                nft.mint(owner, 16).await?;
                nft.safe_transfer_from(owner, &receiver_account, 16, "gift")
                    .await?;
                expect_eq("owner of 16", receiver_account, nft.owner_of(16).await?)
            })
            .step("safe transfer to an account", async {
                nft.mint(owner, 17).await?;
                nft.safe_transfer_from(owner, other, 17, "").await?;
                expect_eq("owner of 17", *other, nft.owner_of(17).await?)
            })
            .run()
            .await;
        Ok(report)
    }

    /// Seed walkthrough followed by the property checks.
    ///
    /// # Errors
    ///
    /// As for [`NftScenario::seed`] and [`NftScenario::properties`].
    pub async fn run(&self) -> ScenarioResult<Vec<ScenarioReport>> {
        Ok(vec![self.seed().await?, self.properties().await?])
    }
}
