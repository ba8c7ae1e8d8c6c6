//! Typed binding for ERC721-style NFT contracts.
//!
//! The interface is checked once, at bind time, against the compiled ACI.
//! After that every method maps one entry point with fixed argument and
//! result types.

use crate::error::{SdkError, SdkResult};
use crate::instance::{CallResult, ContractInstance};
use crate::loader::ContractArtifact;
use crate::session::ClientSession;
use harness_aci::{args, Value};
use harness_primitives::{AccountAddress, ContractAddress};

/// Entry points an NFT contract must expose, with their arity.
pub const REQUIRED_ENTRYPOINTS: &[(&str, usize)] = &[
    ("name", 0),
    ("symbol", 0),
    ("mint", 2),
    ("owner_of", 1),
    ("balance_of", 1),
    ("get_approved", 1),
    ("is_approved_for_all", 2),
    ("approve", 2),
    ("set_approval_for_all", 2),
    ("transfer_from", 3),
    ("safe_transfer_from", 4),
    ("burn", 1),
];

/// NFT contract seen through one session.
#[derive(Debug, Clone)]
pub struct Nft {
    instance: ContractInstance,
}

impl Nft {
    /// Wraps `instance` after checking its interface.
    ///
    /// # Errors
    ///
    /// `SdkError::Interface` listing every missing or mis-sized entry point.
    pub fn bind(instance: ContractInstance) -> SdkResult<Self> {
        let aci = &instance.compiled().aci;
        let missing: Vec<String> = REQUIRED_ENTRYPOINTS
            .iter()
            .filter(|(name, arity)| !aci.has_function(name, *arity))
            .map(|(name, arity)| format!("{name}/{arity}"))
            .collect();
        if !missing.is_empty() {
            return Err(SdkError::interface(format!(
                "{} is not an NFT contract, missing {}",
                aci.name,
                missing.join(", ")
            )));
        }
        Ok(Self { instance })
    }

    /// Deploys `artifact` with the given metadata.
    ///
    /// # Errors
    ///
    /// Compile, deploy and interface errors.
    pub async fn deploy(
        session: &ClientSession,
        artifact: &ContractArtifact,
        name: &str,
        symbol: &str,
    ) -> SdkResult<Self> {
        let instance = session.contract(artifact).await?;
        let mut nft = Self::bind(instance)?;
        nft.instance.deploy(args![name, symbol]).await?;
        Ok(nft)
    }

    /// Binds a contract that is already deployed at `address`.
    ///
    /// # Errors
    ///
    /// Bind and interface errors.
    pub async fn at(
        session: &ClientSession,
        artifact: &ContractArtifact,
        address: ContractAddress,
    ) -> SdkResult<Self> {
        Self::bind(session.at(artifact, address).await?)
    }

    #[must_use]
    pub const fn instance(&self) -> &ContractInstance {
        &self.instance
    }

    /// Deployed address.
    ///
    /// # Errors
    ///
    /// `SdkError::Call` if the contract is not deployed.
    pub fn address(&self) -> SdkResult<ContractAddress> {
        self.instance
            .address()
            .ok_or_else(|| SdkError::call("address", "NFT contract is not deployed"))
    }

    pub async fn name(&self) -> SdkResult<String> {
        Ok(self.instance.call_as("name", args![]).await?.decoded_result)
    }

    pub async fn symbol(&self) -> SdkResult<String> {
        Ok(self.instance.call_as("symbol", args![]).await?.decoded_result)
    }

    pub async fn owner_of(&self, token_id: u64) -> SdkResult<AccountAddress> {
        Ok(self
            .instance
            .call_as("owner_of", args![token_id])
            .await?
            .decoded_result)
    }

    pub async fn balance_of(&self, owner: &AccountAddress) -> SdkResult<u64> {
        Ok(self
            .instance
            .call_as("balance_of", args![owner])
            .await?
            .decoded_result)
    }

    /// Single-token approval, `None` when nobody is approved.
    pub async fn get_approved(&self, token_id: u64) -> SdkResult<Option<AccountAddress>> {
        Ok(self
            .instance
            .call_as("get_approved", args![token_id])
            .await?
            .decoded_result)
    }

    pub async fn is_approved_for_all(
        &self,
        owner: &AccountAddress,
        operator: &AccountAddress,
    ) -> SdkResult<bool> {
        Ok(self
            .instance
            .call_as("is_approved_for_all", args![owner, operator])
            .await?
            .decoded_result)
    }

    /// Mints `token_id` to `to`. Fails with "Already minted" the second time.
    pub async fn mint(&self, to: &AccountAddress, token_id: u64) -> SdkResult<CallResult<Value>> {
        self.instance.call("mint", args![to, token_id]).await
    }

    pub async fn approve(
        &self,
        approved: &AccountAddress,
        token_id: u64,
    ) -> SdkResult<CallResult<Value>> {
        self.instance.call("approve", args![approved, token_id]).await
    }

    pub async fn set_approval_for_all(
        &self,
        operator: &AccountAddress,
        approved: bool,
    ) -> SdkResult<CallResult<Value>> {
        self.instance
            .call("set_approval_for_all", args![operator, approved])
            .await
    }

    pub async fn transfer_from(
        &self,
        from: &AccountAddress,
        to: &AccountAddress,
        token_id: u64,
    ) -> SdkResult<CallResult<Value>> {
        self.instance
            .call("transfer_from", args![from, to, token_id])
            .await
    }

    /// Transfer that asks a contract recipient to accept the token.
    ///
    /// Contract recipients are passed as accounts
    /// (`ContractAddress::as_account`).
    pub async fn safe_transfer_from(
        &self,
        from: &AccountAddress,
        to: &AccountAddress,
        token_id: u64,
        data: &str,
    ) -> SdkResult<CallResult<Value>> {
        self.instance
            .call("safe_transfer_from", args![from, to, token_id, data])
            .await
    }

    pub async fn burn(&self, token_id: u64) -> SdkResult<CallResult<Value>> {
        self.instance.call("burn", args![token_id]).await
    }
}
