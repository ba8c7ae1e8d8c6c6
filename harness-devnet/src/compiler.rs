//! In-process stand-in for the compiler service.

use crate::codec::{decode_value, Bytecode, Calldata, DEVNET_COMPILER_VERSION};
use crate::scanner::{scan, ScannedContract};
use async_trait::async_trait;
use harness_aci::{FunctionAci, Value, INIT};
use harness_primitives::EncodedBytes;
use harness_rpc::{CompileOutput, CompilerApi, ReturnType, RpcError, RpcResult, SourceUnit};
use serde_json::Value as Json;
use tracing::debug;

/// Compiler emulation backed by [`scan`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DevnetCompiler;

impl DevnetCompiler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn function<'a>(
        contract: &'a ScannedContract,
        name: &str,
    ) -> RpcResult<Option<&'a FunctionAci>> {
        match contract.function(name) {
            Some(function) => Ok(Some(function)),
            // a contract without init still gets an implicit one
            None if name == INIT => Ok(None),
            None => Err(RpcError::invalid_params(format!(
                "Unknown function '{name}' in contract {}",
                contract.name
            ))),
        }
    }
}

#[async_trait]
impl CompilerApi for DevnetCompiler {
    async fn version(&self) -> RpcResult<String> {
        Ok(DEVNET_COMPILER_VERSION.to_string())
    }

    async fn compile(&self, source: SourceUnit<'_>) -> RpcResult<CompileOutput> {
        let contract = scan(source.code, source.file_system)?;
        let bytecode = Bytecode::new(&contract.name, source.code, source.file_system).encode()?;
        debug!(
            target: "harness_devnet",
            contract = %contract.name,
            entrypoints = contract.functions.len(),
            "compiled"
        );
        Ok(CompileOutput {
            bytecode,
            aci: contract.aci_json(),
        })
    }

    async fn encode_calldata(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        arguments: &[String],
    ) -> RpcResult<EncodedBytes> {
        let contract = scan(source.code, source.file_system)?;
        let values = arguments
            .iter()
            .map(|literal| Value::parse_literal(literal))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;

        match Self::function(&contract, function)? {
            Some(declared) => declared
                .check_arguments(&values)
                .map_err(|e| RpcError::invalid_params(e.to_string()))?,
            None if values.is_empty() => {}
            None => {
                return Err(RpcError::invalid_params(format!(
                    "{} has no init, so it takes no arguments",
                    contract.name
                )))
            }
        }

        Ok(Calldata {
            function: function.to_string(),
            arguments: values,
        }
        .encode()?)
    }

    async fn decode_call_result(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        call_result: ReturnType,
        call_value: &EncodedBytes,
    ) -> RpcResult<Json> {
        let contract = scan(source.code, source.file_system)?;
        Self::function(&contract, function)?;
        let value = decode_value(call_value)
            .map_err(|e| RpcError::invalid_params(e.message().to_string()))?;
        Ok(match (call_result, value) {
            (ReturnType::Ok, value) => value.to_json(),
            (_, Value::String(message)) => Json::String(message),
            (_, other) => Json::String(other.to_literal()),
        })
    }
}
