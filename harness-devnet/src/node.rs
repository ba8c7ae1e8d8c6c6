//! In-process stand-in for the node.
//!
//! Every accepted transaction is mined immediately into its own block. The
//! signer's nonce advances even when the call reverts, but contract state is
//! only replaced when execution succeeds.

use crate::codec::{encode_value, Bytecode, Calldata};
use crate::error::{ExecError, ExecResult};
use crate::native::Native;
use crate::state::{Account, CallContext, CallEnv, DeployedContract, World, CREATE_GAS};
use async_trait::async_trait;
use harness_aci::{Value, INIT};
use harness_primitives::{sha256, AccountAddress, ContractAddress, EncodedBytes, TxHash};
use harness_rpc::{
    codes, AccountInfo, CallInfo, ContractCreateTx, ContractInfo, DryRunRequest, DryRunResult,
    NodeApi, NodeStatus, ReturnType, RpcError, RpcResult, SignedTx, Tx, TxInfo,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Version reported by `status`.
pub const DEVNET_NODE_VERSION: &str = "7.0.0-devnet";

/// Gas limit of dry runs.
const DRY_RUN_GAS: u64 = 1_000_000;

struct TxRecord {
    info: TxInfo,
    /// Polls left that still report the transaction as pending.
    pending_polls: u32,
}

struct Chain {
    height: u64,
    world: World,
    transactions: HashMap<TxHash, TxRecord>,
}

/// Node emulation.
pub struct DevnetNode {
    network_id: String,
    inclusion_delay: u32,
    chain: Mutex<Chain>,
}

impl std::fmt::Debug for DevnetNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain = self.chain.lock();
        f.debug_struct("DevnetNode")
            .field("network_id", &self.network_id)
            .field("height", &chain.height)
            .field("contracts", &chain.world.contracts.len())
            .finish()
    }
}

impl DevnetNode {
    #[must_use]
    pub fn new<S: Into<String>>(network_id: S) -> Self {
        Self {
            network_id: network_id.into(),
            inclusion_delay: 0,
            chain: Mutex::new(Chain {
                height: 0,
                world: World::default(),
                transactions: HashMap::new(),
            }),
        }
    }

    /// Reports each transaction as pending for `polls` lookups before it
    /// shows up as included.
    #[must_use]
    pub const fn with_inclusion_delay(mut self, polls: u32) -> Self {
        self.inclusion_delay = polls;
        self
    }

    #[must_use]
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Current block height.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.chain.lock().height
    }

    /// Credits `amount` to `account`, creating it if needed.
    pub fn fund(&self, account: &AccountAddress, amount: u128) {
        let mut chain = self.chain.lock();
        let entry = chain.world.accounts.entry(*account).or_default();
        entry.balance = entry.balance.saturating_add(amount);
    }

    /// Address a create transaction from `owner` with `nonce` deploys to.
    #[must_use]
    pub fn contract_address(owner: &AccountAddress, nonce: u64) -> ContractAddress {
        let mut preimage = owner.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        ContractAddress::from_bytes(sha256(&preimage))
    }

    fn reject(code: i64, message: impl Into<String>) -> RpcError {
        RpcError::server(code, message)
    }

    fn apply(chain: &mut Chain, signed: &SignedTx) -> RpcResult<CallInfo> {
        let signer = *signed.tx.signer();
        let nonce = signed.tx.nonce();
        let expected = chain.world.accounts.get(&signer).map_or(0, |a| a.nonce) + 1;
        if nonce != expected {
            return Err(Self::reject(
                codes::INVALID_NONCE,
                format!("Invalid nonce {nonce} for {signer}, expected {expected}"),
            ));
        }
        if let Tx::ContractCallTx(call) = &signed.tx {
            if !chain.world.contracts.contains_key(&call.contract_id) {
                return Err(Self::reject(
                    codes::UNKNOWN_CONTRACT,
                    format!("Contract {} not found", call.contract_id),
                ));
            }
        }
        let ttl = match &signed.tx {
            Tx::ContractCreateTx(tx) => tx.ttl,
            Tx::ContractCallTx(tx) => tx.ttl,
        };
        if ttl != 0 && ttl <= chain.height {
            return Err(Self::reject(
                codes::TX_REJECTED,
                format!("Transaction expired at height {ttl}"),
            ));
        }

        let account: &mut Account = chain.world.accounts.entry(signer).or_default();
        account.nonce = nonce;

        let mut draft = chain.world.clone();
        let (contract_id, outcome, gas_used) = match &signed.tx {
            Tx::ContractCreateTx(tx) => {
                let contract_id = Self::contract_address(&signer, nonce);
                let (outcome, gas_used) = execute_create(&mut draft, contract_id, tx);
                (contract_id, outcome, gas_used)
            }
            Tx::ContractCallTx(tx) => {
                let (outcome, gas_used) =
                    execute_call(&mut draft, signer, tx.contract_id, &tx.call_data, tx.gas);
                (tx.contract_id, outcome, gas_used)
            }
        };
        if outcome.is_ok() {
            chain.world = draft;
        }
        let (return_type, return_value) = encode_outcome(&outcome)?;

        Ok(CallInfo {
            caller_id: signer,
            contract_id,
            return_type,
            return_value,
            gas_used,
        })
    }
}

fn execute_create(
    world: &mut World,
    contract_id: ContractAddress,
    tx: &ContractCreateTx,
) -> (ExecResult<Value>, u64) {
    let mut env = CallEnv::new(world, tx.owner_id, tx.gas);
    let outcome = create(&mut env, contract_id, tx);
    (outcome, env.gas_used())
}

fn create(
    env: &mut CallEnv<'_>,
    contract_id: ContractAddress,
    tx: &ContractCreateTx,
) -> ExecResult<Value> {
    env.charge(CREATE_GAS)?;
    let bytecode = Bytecode::decode(&tx.code)?;
    let calldata = Calldata::decode(&tx.call_data)?;
    if calldata.function != INIT {
        return Err(ExecError::error(format!(
            "create must call init, not {}",
            calldata.function
        )));
    }
    let ctx = CallContext {
        caller: tx.owner_id,
        contract: contract_id,
        origin: tx.owner_id,
    };
    let native = Native::deploy(&bytecode.contract, &ctx, &calldata.arguments)?;
    env.world_mut().contracts.insert(
        contract_id,
        DeployedContract {
            owner: tx.owner_id,
            bytecode: tx.code.clone(),
            name: bytecode.contract,
            native,
        },
    );
    Ok(Value::Unit)
}

fn execute_call(
    world: &mut World,
    caller: AccountAddress,
    contract: ContractAddress,
    call_data: &EncodedBytes,
    gas: u64,
) -> (ExecResult<Value>, u64) {
    let mut env = CallEnv::new(world, caller, gas);
    let outcome = Calldata::decode(call_data)
        .and_then(|calldata| env.call(caller, contract, &calldata.function, &calldata.arguments));
    (outcome, env.gas_used())
}

fn encode_outcome(outcome: &ExecResult<Value>) -> RpcResult<(ReturnType, EncodedBytes)> {
    Ok(match outcome {
        Ok(value) => (ReturnType::Ok, encode_value(value)?),
        Err(err) => (
            err.return_type(),
            encode_value(&Value::String(err.message().to_string()))?,
        ),
    })
}

#[async_trait]
impl NodeApi for DevnetNode {
    async fn status(&self) -> RpcResult<NodeStatus> {
        Ok(NodeStatus {
            network_id: self.network_id.clone(),
            node_version: DEVNET_NODE_VERSION.to_string(),
            top_height: self.height(),
        })
    }

    async fn account(&self, id: &AccountAddress) -> RpcResult<Option<AccountInfo>> {
        let chain = self.chain.lock();
        Ok(chain.world.accounts.get(id).map(|account| AccountInfo {
            id: *id,
            balance: account.balance,
            nonce: account.nonce,
        }))
    }

    async fn contract(&self, id: &ContractAddress) -> RpcResult<Option<ContractInfo>> {
        let chain = self.chain.lock();
        Ok(chain.world.contracts.get(id).map(|contract| ContractInfo {
            id: *id,
            owner_id: contract.owner,
            active: true,
        }))
    }

    async fn contract_code(&self, id: &ContractAddress) -> RpcResult<EncodedBytes> {
        let chain = self.chain.lock();
        chain
            .world
            .contracts
            .get(id)
            .map(|contract| contract.bytecode.clone())
            .ok_or_else(|| {
                Self::reject(codes::UNKNOWN_CONTRACT, format!("Contract {id} not found"))
            })
    }

    async fn send_transaction(&self, tx: &EncodedBytes) -> RpcResult<TxHash> {
        let signed = SignedTx::decode(tx)
            .map_err(|e| Self::reject(codes::INVALID_PARAMS, e.to_string()))?;
        signed
            .verify(&self.network_id)
            .map_err(|e| Self::reject(codes::INVALID_SIGNATURE, e.to_string()))?;
        let tx_hash = signed.hash()?;

        let mut chain = self.chain.lock();
        if chain.transactions.contains_key(&tx_hash) {
            return Err(Self::reject(
                codes::TX_REJECTED,
                format!("Transaction {tx_hash} already known"),
            ));
        }
        let call_info = Self::apply(&mut chain, &signed)?;
        chain.height += 1;

        info!(
            target: "harness_devnet",
            %tx_hash,
            kind = signed.tx.kind(),
            contract = %call_info.contract_id,
            return_type = %call_info.return_type,
            height = chain.height,
            "mined"
        );
        if !call_info.return_type.is_ok() {
            debug!(target: "harness_devnet", %tx_hash, "state changes dropped");
        }

        let info = TxInfo {
            block_height: chain.height,
            call_info,
        };
        chain.transactions.insert(
            tx_hash,
            TxRecord {
                info,
                pending_polls: self.inclusion_delay,
            },
        );
        Ok(tx_hash)
    }

    async fn transaction_info(&self, hash: &TxHash) -> RpcResult<Option<TxInfo>> {
        let mut chain = self.chain.lock();
        let record = chain.transactions.get_mut(hash).ok_or_else(|| {
            Self::reject(
                codes::UNKNOWN_TRANSACTION,
                format!("Transaction {hash} not found"),
            )
        })?;
        if record.pending_polls > 0 {
            record.pending_polls -= 1;
            return Ok(None);
        }
        Ok(Some(record.info.clone()))
    }

    async fn dry_run(&self, request: &DryRunRequest) -> RpcResult<DryRunResult> {
        let mut world = {
            let chain = self.chain.lock();
            if !chain.world.contracts.contains_key(&request.contract_id) {
                return Err(Self::reject(
                    codes::UNKNOWN_CONTRACT,
                    format!("Contract {} not found", request.contract_id),
                ));
            }
            chain.world.clone()
        };
        let (outcome, gas_used) = execute_call(
            &mut world,
            request.caller_id,
            request.contract_id,
            &request.call_data,
            DRY_RUN_GAS,
        );
        let (return_type, return_value) = encode_outcome(&outcome)?;
        Ok(DryRunResult {
            return_type,
            return_value,
            gas_used,
        })
    }
}
