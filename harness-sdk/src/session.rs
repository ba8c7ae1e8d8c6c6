//! Client sessions: one signer talking to one node and one compiler.

use crate::error::{SdkError, SdkResult};
use crate::instance::ContractInstance;
use crate::loader::ContractArtifact;
use harness_aci::{ContractAci, Value};
use harness_config::{NetworkConfig, DEFAULT_NETWORK_ID};
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use harness_rpc::{
    CompilerApi, CompilerClient, DryRunRequest, DryRunResult, NodeApi, NodeClient, RpcError,
    RpcClientHooks, SignedTx, Tx, TxInfo, TxParams,
};
use harness_wallet::Keypair;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Transaction and polling settings of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Network id mixed into signatures.
    pub network_id: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Gas and fee settings for every transaction.
    pub tx_params: TxParams,
}

impl SessionOptions {
    /// Options taken from a network entry.
    #[must_use]
    pub fn from_network(network: &NetworkConfig) -> Self {
        Self {
            network_id: network.network_id.clone(),
            poll_interval: network.poll_interval(),
            max_poll_attempts: network.max_poll_attempts,
            tx_params: TxParams::default(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID.to_string(),
            poll_interval: Duration::from_millis(500),
            max_poll_attempts: 40,
            tx_params: TxParams::default(),
        }
    }
}

/// Bytecode and interface produced by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    pub bytecode: EncodedBytes,
    pub aci: ContractAci,
}

/// A transaction that made it into a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub info: TxInfo,
}

/// Signer plus transports. Cheap to clone; clones share transports.
#[derive(Clone)]
pub struct ClientSession {
    keypair: Keypair,
    node: Arc<dyn NodeApi>,
    compiler: Arc<dyn CompilerApi>,
    options: SessionOptions,
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("address", self.keypair.address())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ClientSession {
    #[must_use]
    pub fn new(
        keypair: Keypair,
        node: Arc<dyn NodeApi>,
        compiler: Arc<dyn CompilerApi>,
        options: SessionOptions,
    ) -> Self {
        Self {
            keypair,
            node,
            compiler,
            options,
        }
    }

    /// Session over HTTP transports configured from `network`.
    ///
    /// # Errors
    ///
    /// `SdkError::Transport` if an HTTP client cannot be built.
    pub fn connect(network: &NetworkConfig, keypair: Keypair) -> SdkResult<Self> {
        let node = NodeClient::builder(network.node_url.clone())
            .timeout(network.request_timeout())
            .hooks(RpcClientHooks::tracing())
            .build()?;
        let compiler = CompilerClient::builder(network.compiler_url.clone())
            .timeout(network.request_timeout())
            .hooks(RpcClientHooks::tracing())
            .build()?;

        info!(
            target: "harness_sdk",
            node = %network.node_url,
            compiler = %network.compiler_url,
            account = %keypair.address(),
            "session connected"
        );
        Ok(Self::new(
            keypair,
            Arc::new(node),
            Arc::new(compiler),
            SessionOptions::from_network(network),
        ))
    }

    /// Account that signs this session's transactions.
    #[must_use]
    pub const fn address(&self) -> &AccountAddress {
        self.keypair.address()
    }

    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    #[must_use]
    pub fn node(&self) -> &Arc<dyn NodeApi> {
        &self.node
    }

    #[must_use]
    pub fn compiler(&self) -> &Arc<dyn CompilerApi> {
        &self.compiler
    }

    /// Compiles `artifact`.
    ///
    /// # Errors
    ///
    /// `SdkError::Compile` with the compiler's messages on invalid source.
    pub async fn compile(&self, artifact: &ContractArtifact) -> SdkResult<CompiledContract> {
        let output = self.compiler.compile(artifact.source_unit()).await?;
        let aci = ContractAci::from_json(&output.aci).map_err(|e| {
            SdkError::Transport(RpcError::invalid_response(format!("compiler ACI: {e}")))
        })?;
        debug!(
            target: "harness_sdk",
            contract = %aci.name,
            entrypoints = aci.functions.len(),
            "compiled"
        );
        Ok(CompiledContract {
            bytecode: output.bytecode,
            aci,
        })
    }

    /// Compiles `artifact` into an instance that is not yet deployed.
    ///
    /// # Errors
    ///
    /// As for [`ClientSession::compile`].
    pub async fn contract(&self, artifact: &ContractArtifact) -> SdkResult<ContractInstance> {
        let compiled = self.compile(artifact).await?;
        Ok(ContractInstance::new(self.clone(), artifact.clone(), compiled))
    }

    /// Compiles and deploys `artifact` with constructor arguments `args`.
    ///
    /// # Errors
    ///
    /// Compile, interface, transport and deploy errors.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: Vec<Value>,
    ) -> SdkResult<ContractInstance> {
        let mut instance = self.contract(artifact).await?;
        instance.deploy(args).await?;
        Ok(instance)
    }

    /// Binds an already deployed contract without redeploying it.
    ///
    /// # Errors
    ///
    /// `SdkError::Bind` when nothing is deployed at `address` or the deployed
    /// bytecode is not the artifact's.
    pub async fn at(
        &self,
        artifact: &ContractArtifact,
        address: ContractAddress,
    ) -> SdkResult<ContractInstance> {
        let compiled = self.compile(artifact).await?;

        let bind_error = |message: String| SdkError::Bind { address, message };
        match self.node.contract(&address).await? {
            Some(info) if info.active => {}
            Some(_) => return Err(bind_error("contract is inactive".to_string())),
            None => return Err(bind_error("no contract at this address".to_string())),
        }
        let onchain = self.node.contract_code(&address).await?;
        if onchain != compiled.bytecode {
            return Err(bind_error(format!(
                "deployed bytecode differs from compiled {}",
                compiled.aci.name
            )));
        }

        debug!(target: "harness_sdk", %address, contract = %compiled.aci.name, "bound");
        Ok(ContractInstance::bound(
            self.clone(),
            artifact.clone(),
            compiled,
            address,
        ))
    }

    /// Nonce for the next transaction, read from the node.
    ///
    /// # Errors
    ///
    /// Transport failures.
    pub async fn next_nonce(&self) -> SdkResult<u64> {
        Ok(self
            .node
            .account(self.address())
            .await?
            .map_or(1, |account| account.next_nonce()))
    }

    /// Signs, submits and waits for inclusion of `tx`.
    ///
    /// # Errors
    ///
    /// `SdkError::Node` if the node rejects it, `SdkError::Transport` with a
    /// timeout when polling is exhausted.
    pub async fn submit(&self, tx: Tx) -> SdkResult<TxOutcome> {
        let kind = tx.kind();
        let signed = SignedTx::sign(tx, &self.keypair, &self.options.network_id)?;
        let tx_hash = self.node.send_transaction(&signed.encode()?).await?;
        debug!(target: "harness_sdk", %tx_hash, kind, "submitted");

        let info = self.wait_for(&tx_hash).await?;
        Ok(TxOutcome { tx_hash, info })
    }

    /// Polls until `tx_hash` is included.
    ///
    /// # Errors
    ///
    /// `SdkError::Transport` wrapping `RpcError::Timeout` after
    /// `max_poll_attempts` polls.
    pub async fn wait_for(&self, tx_hash: &TxHash) -> SdkResult<TxInfo> {
        for attempt in 1..=self.options.max_poll_attempts {
            if let Some(info) = self.node.transaction_info(tx_hash).await? {
                debug!(
                    target: "harness_sdk",
                    %tx_hash,
                    attempt,
                    height = info.block_height,
                    "included"
                );
                return Ok(info);
            }
            if attempt < self.options.max_poll_attempts {
                tokio::time::sleep(self.options.poll_interval).await;
            }
        }
        Err(SdkError::Transport(RpcError::timeout(format!(
            "inclusion of {tx_hash} after {} polls",
            self.options.max_poll_attempts
        ))))
    }

    /// Read-only execution as this session's account.
    ///
    /// # Errors
    ///
    /// Transport failures and node rejections.
    pub async fn dry_run(
        &self,
        contract: ContractAddress,
        call_data: EncodedBytes,
    ) -> SdkResult<DryRunResult> {
        let request = DryRunRequest {
            caller_id: *self.address(),
            contract_id: contract,
            call_data,
        };
        Ok(self.node.dry_run(&request).await?)
    }
}
