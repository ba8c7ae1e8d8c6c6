//! Transport traits the SDK is written against.
//!
//! The HTTP clients in this crate implement them for a real node and
//! compiler; the devnet implements them in process.

use crate::error::RpcResult;
use crate::models::{
    AccountInfo, CompileOutput, ContractInfo, DryRunRequest, DryRunResult, NodeStatus,
    ReturnType, TxInfo,
};
use crate::source::SourceUnit;
use async_trait::async_trait;
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use serde_json::Value as Json;

/// Node operations used by the harness.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Network id and chain height.
    async fn status(&self) -> RpcResult<NodeStatus>;

    /// Account state, `None` for an account the node has never seen.
    async fn account(&self, id: &AccountAddress) -> RpcResult<Option<AccountInfo>>;

    /// Contract metadata, `None` when nothing is deployed at `id`.
    async fn contract(&self, id: &ContractAddress) -> RpcResult<Option<ContractInfo>>;

    /// Deployed bytecode.
    async fn contract_code(&self, id: &ContractAddress) -> RpcResult<EncodedBytes>;

    /// Submits a signed `tx_` payload.
    async fn send_transaction(&self, tx: &EncodedBytes) -> RpcResult<TxHash>;

    /// Inclusion info, `None` while the transaction is pending.
    async fn transaction_info(&self, hash: &TxHash) -> RpcResult<Option<TxInfo>>;

    /// Executes a call without committing state.
    async fn dry_run(&self, request: &DryRunRequest) -> RpcResult<DryRunResult>;
}

/// Compiler operations used by the harness.
#[async_trait]
pub trait CompilerApi: Send + Sync {
    /// Compiler version string.
    async fn version(&self) -> RpcResult<String>;

    /// Compiles source to bytecode and ACI.
    async fn compile(&self, source: SourceUnit<'_>) -> RpcResult<CompileOutput>;

    /// Encodes a call to `function` with source-literal arguments.
    async fn encode_calldata(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        arguments: &[String],
    ) -> RpcResult<EncodedBytes>;

    /// Decodes the value a call to `function` returned.
    async fn decode_call_result(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        call_result: ReturnType,
        call_value: &EncodedBytes,
    ) -> RpcResult<Json>;
}
