//! Request and response shapes of the node and compiler APIs.

use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Json>,
}

impl RpcRequest {
    /// Request with id 1, as the node clients send it.
    #[must_use]
    pub fn new(method: &str, params: Vec<Json>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Json>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Json,
    #[serde(default)]
    pub result: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcResponseError>,
}

/// `getstatus` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub network_id: String,
    pub node_version: String,
    pub top_height: u64,
}

/// `getaccount` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: AccountAddress,
    pub balance: u128,
    /// Nonce of the last accepted transaction; 0 when none.
    pub nonce: u64,
}

impl AccountInfo {
    /// Nonce the next transaction from this account must carry.
    #[must_use]
    pub const fn next_nonce(&self) -> u64 {
        self.nonce + 1
    }
}

/// `getcontract` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub id: ContractAddress,
    pub owner_id: AccountAddress,
    pub active: bool,
}

/// `getcontractcode` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCode {
    pub bytecode: EncodedBytes,
}

/// `sendtransaction` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub tx_hash: TxHash,
}

/// How a contract call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Ok,
    /// Contract aborted; the return value holds its message.
    Revert,
    /// The VM failed (out of gas, bad calldata).
    Error,
}

impl ReturnType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Revert => "revert",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution record of a create or call transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    pub caller_id: AccountAddress,
    pub contract_id: ContractAddress,
    pub return_type: ReturnType,
    pub return_value: EncodedBytes,
    pub gas_used: u64,
}

/// `gettransactioninfo` result for an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    pub block_height: u64,
    pub call_info: CallInfo,
}

/// `dryrun` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunRequest {
    pub caller_id: AccountAddress,
    pub contract_id: ContractAddress,
    pub call_data: EncodedBytes,
}

/// `dryrun` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunResult {
    pub return_type: ReturnType,
    pub return_value: EncodedBytes,
    pub gas_used: u64,
}

/// `/compile` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOutput {
    pub bytecode: EncodedBytes,
    pub aci: Json,
}

/// Position of a compiler diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub col: u32,
}

/// One compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pos: SourcePos,
    pub message: String,
}

impl fmt::Display for CompilerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos.file {
            Some(file) => write!(
                f,
                "{} error in '{file}' at line {}, col {}: {}",
                self.kind, self.pos.line, self.pos.col, self.message
            ),
            None => write!(
                f,
                "{} error at line {}, col {}: {}",
                self.kind, self.pos.line, self.pos.col, self.message
            ),
        }
    }
}
