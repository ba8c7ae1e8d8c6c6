//! Node and compiler transports for the contract harness.
//!
//! The SDK only sees [`NodeApi`] and [`CompilerApi`]. This crate provides
//! their HTTP implementations ([`NodeClient`], JSON-RPC 2.0; and
//! [`CompilerClient`], REST), the wire models, and the contract transaction
//! types with their signing rules.

pub mod api;
pub mod compiler_client;
pub mod error;
pub mod hooks;
pub mod models;
pub mod node_client;
pub mod source;
pub mod tx;

pub use api::{CompilerApi, NodeApi};
pub use compiler_client::{CompilerClient, CompilerClientBuilder};
pub use error::{codes, RpcError, RpcResult};
pub use hooks::{RpcClientHooks, RpcRequestOutcome};
pub use models::{
    AccountInfo, CallInfo, CompileOutput, CompilerMessage, ContractInfo, DryRunRequest,
    DryRunResult, NodeStatus, ReturnType, SourcePos, TxInfo,
};
pub use node_client::{NodeClient, NodeClientBuilder, DEFAULT_HTTP_TIMEOUT};
pub use source::{include_directives, is_stdlib_include, SourceUnit, STDLIB_INCLUDES};
pub use tx::{ContractCallTx, ContractCreateTx, SignedTx, Tx, TxParams};
