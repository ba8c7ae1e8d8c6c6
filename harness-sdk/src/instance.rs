//! Deployed (or deployable) contract instances.

use crate::error::{SdkError, SdkResult};
use crate::loader::ContractArtifact;
use crate::session::{ClientSession, CompiledContract};
use harness_aci::{FromValue, FunctionAci, Value, INIT};
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use harness_rpc::{CallInfo, ContractCallTx, ContractCreateTx, ReturnType, Tx};
use serde_json::Value as Json;
use tracing::{debug, info};

/// Decoded outcome of an entry point call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult<T> {
    pub decoded_result: T,
    /// Present for calls submitted as transactions.
    pub tx_hash: Option<TxHash>,
    pub return_type: ReturnType,
    pub gas_used: u64,
}

impl CallResult<Value> {
    /// Converts the decoded value into a Rust type.
    ///
    /// # Errors
    ///
    /// `SdkError::Decode` when the value does not fit `T`.
    pub fn into_typed<T: FromValue>(self, entrypoint: &str) -> SdkResult<CallResult<T>> {
        let decoded_result =
            T::from_value(self.decoded_result).map_err(|source| SdkError::Decode {
                entrypoint: entrypoint.to_string(),
                source,
            })?;
        Ok(CallResult {
            decoded_result,
            tx_hash: self.tx_hash,
            return_type: self.return_type,
            gas_used: self.gas_used,
        })
    }
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployInfo {
    pub address: ContractAddress,
    pub tx_hash: TxHash,
    pub owner: AccountAddress,
    pub result: CallInfo,
}

/// A compiled contract, bound to an address once deployed.
#[derive(Debug, Clone)]
pub struct ContractInstance {
    session: ClientSession,
    artifact: ContractArtifact,
    compiled: CompiledContract,
    address: Option<ContractAddress>,
    deploy_info: Option<DeployInfo>,
}

impl ContractInstance {
    pub(crate) fn new(
        session: ClientSession,
        artifact: ContractArtifact,
        compiled: CompiledContract,
    ) -> Self {
        Self {
            session,
            artifact,
            compiled,
            address: None,
            deploy_info: None,
        }
    }

    pub(crate) fn bound(
        session: ClientSession,
        artifact: ContractArtifact,
        compiled: CompiledContract,
        address: ContractAddress,
    ) -> Self {
        Self {
            address: Some(address),
            ..Self::new(session, artifact, compiled)
        }
    }

    #[must_use]
    pub const fn session(&self) -> &ClientSession {
        &self.session
    }

    #[must_use]
    pub const fn compiled(&self) -> &CompiledContract {
        &self.compiled
    }

    /// Contract name from the interface.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.compiled.aci.name
    }

    /// Address once deployed or bound.
    #[must_use]
    pub const fn address(&self) -> Option<ContractAddress> {
        self.address
    }

    /// Deployment record, only for instances this session deployed.
    #[must_use]
    pub const fn deploy_info(&self) -> Option<&DeployInfo> {
        self.deploy_info.as_ref()
    }

    fn function(&self, entrypoint: &str) -> SdkResult<&FunctionAci> {
        self.compiled
            .aci
            .require(entrypoint)
            .map_err(SdkError::Interface)
    }

    fn require_address(&self, entrypoint: &str) -> SdkResult<ContractAddress> {
        self.address
            .ok_or_else(|| SdkError::call(entrypoint, format!("{} is not deployed", self.name())))
    }

    async fn encode_call(&self, entrypoint: &str, args: &[Value]) -> SdkResult<EncodedBytes> {
        let literals: Vec<String> = args.iter().map(Value::to_literal).collect();
        Ok(self
            .session
            .compiler()
            .encode_calldata(self.artifact.source_unit(), entrypoint, &literals)
            .await?)
    }

    async fn decode_raw(
        &self,
        entrypoint: &str,
        return_type: ReturnType,
        value: &EncodedBytes,
    ) -> SdkResult<Json> {
        Ok(self
            .session
            .compiler()
            .decode_call_result(self.artifact.source_unit(), entrypoint, return_type, value)
            .await?)
    }

    /// Message of a revert or VM error.
    async fn failure_message(
        &self,
        entrypoint: &str,
        return_type: ReturnType,
        value: &EncodedBytes,
    ) -> String {
        match self.decode_raw(entrypoint, return_type, value).await {
            Ok(Json::String(message)) => message,
            Ok(other) => other.to_string(),
            Err(err) => format!("{return_type} (undecodable: {err})"),
        }
    }

    async fn decode_result(
        &self,
        function: &FunctionAci,
        return_type: ReturnType,
        value: &EncodedBytes,
        tx_hash: Option<TxHash>,
        gas_used: u64,
    ) -> SdkResult<CallResult<Value>> {
        if !return_type.is_ok() {
            let message = self.failure_message(&function.name, return_type, value).await;
            return Err(SdkError::call(&function.name, message));
        }
        let raw = self.decode_raw(&function.name, return_type, value).await?;
        let decoded_result =
            Value::from_json(&function.returns, &raw).map_err(|source| SdkError::Decode {
                entrypoint: function.name.clone(),
                source,
            })?;
        Ok(CallResult {
            decoded_result,
            tx_hash,
            return_type,
            gas_used,
        })
    }

    /// Deploys the contract, running `init` with `args`.
    ///
    /// # Errors
    ///
    /// `SdkError::Deploy` if already deployed or the constructor reverts,
    /// `SdkError::Interface` if `args` do not fit `init`.
    pub async fn deploy(&mut self, args: Vec<Value>) -> SdkResult<DeployInfo> {
        if let Some(address) = self.address {
            return Err(SdkError::deploy(format!(
                "{} is already deployed at {address}",
                self.name()
            )));
        }
        match self.compiled.aci.init() {
            Some(init) => init.check_arguments(&args).map_err(SdkError::Interface)?,
            None if args.is_empty() => {}
            None => {
                return Err(SdkError::interface(format!(
                    "{} has no init but {} argument(s) were given",
                    self.name(),
                    args.len()
                )))
            }
        }

        let call_data = self.encode_call(INIT, &args).await?;
        let owner = *self.session.address();
        let tx = ContractCreateTx::new(
            owner,
            self.session.next_nonce().await?,
            self.compiled.bytecode.clone(),
            call_data,
            &self.session.options().tx_params,
        );
        let outcome = self.session.submit(Tx::ContractCreateTx(tx)).await?;
        let call_info = outcome.info.call_info;

        if !call_info.return_type.is_ok() {
            let message = self
                .failure_message(INIT, call_info.return_type, &call_info.return_value)
                .await;
            return Err(SdkError::deploy(message));
        }

        let info = DeployInfo {
            address: call_info.contract_id,
            tx_hash: outcome.tx_hash,
            owner,
            result: call_info,
        };
        info!(
            target: "harness_sdk",
            contract = %self.name(),
            address = %info.address,
            tx_hash = %info.tx_hash,
            "deployed"
        );
        self.address = Some(info.address);
        self.deploy_info = Some(info.clone());
        Ok(info)
    }

    /// Calls `entrypoint`; stateful entry points go through a transaction,
    /// others through a dry run.
    ///
    /// # Errors
    ///
    /// `SdkError::Interface` before any traffic if the entry point or
    /// arguments do not match the interface; `SdkError::Call` on revert.
    pub async fn call(&self, entrypoint: &str, args: Vec<Value>) -> SdkResult<CallResult<Value>> {
        if self.function(entrypoint)?.stateful {
            self.call_stateful(entrypoint, args).await
        } else {
            self.call_static(entrypoint, args).await
        }
    }

    /// Calls `entrypoint` and converts the result into `T`.
    ///
    /// # Errors
    ///
    /// As for [`ContractInstance::call`], plus `SdkError::Decode`.
    pub async fn call_as<T: FromValue>(
        &self,
        entrypoint: &str,
        args: Vec<Value>,
    ) -> SdkResult<CallResult<T>> {
        self.call(entrypoint, args).await?.into_typed(entrypoint)
    }

    /// Executes `entrypoint` as a dry run; state is never changed.
    ///
    /// # Errors
    ///
    /// As for [`ContractInstance::call`].
    pub async fn call_static(
        &self,
        entrypoint: &str,
        args: Vec<Value>,
    ) -> SdkResult<CallResult<Value>> {
        let function = self.function(entrypoint)?;
        function.check_arguments(&args).map_err(SdkError::Interface)?;
        let address = self.require_address(entrypoint)?;

        let call_data = self.encode_call(entrypoint, &args).await?;
        let result = self.session.dry_run(address, call_data).await?;
        debug!(
            target: "harness_sdk",
            contract = %self.name(),
            entrypoint,
            return_type = %result.return_type,
            "dry run"
        );
        self.decode_result(
            function,
            result.return_type,
            &result.return_value,
            None,
            result.gas_used,
        )
        .await
    }

    /// Submits `entrypoint` as a signed transaction.
    ///
    /// # Errors
    ///
    /// As for [`ContractInstance::call`], plus node rejections and polling
    /// timeouts.
    pub async fn call_stateful(
        &self,
        entrypoint: &str,
        args: Vec<Value>,
    ) -> SdkResult<CallResult<Value>> {
        let function = self.function(entrypoint)?;
        function.check_arguments(&args).map_err(SdkError::Interface)?;
        let address = self.require_address(entrypoint)?;

        let call_data = self.encode_call(entrypoint, &args).await?;
        let tx = ContractCallTx::new(
            *self.session.address(),
            self.session.next_nonce().await?,
            address,
            call_data,
            &self.session.options().tx_params,
        );
        let outcome = self.session.submit(Tx::ContractCallTx(tx)).await?;
        let call_info = &outcome.info.call_info;
        info!(
            target: "harness_sdk",
            contract = %self.name(),
            entrypoint,
            caller = %self.session.address(),
            return_type = %call_info.return_type,
            tx_hash = %outcome.tx_hash,
            "call"
        );
        self.decode_result(
            function,
            call_info.return_type,
            &call_info.return_value,
            Some(outcome.tx_hash),
            call_info.gas_used,
        )
        .await
    }
}
