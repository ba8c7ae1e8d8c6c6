//! JSON-RPC client for the node.

use crate::api::NodeApi;
use crate::error::{codes, RpcError, RpcResult};
use crate::hooks::{RpcClientHooks, RpcRequestOutcome};
use crate::models::{
    AccountInfo, ContractCode, ContractInfo, DryRunRequest, DryRunResult, NodeStatus,
    RpcRequest, RpcResponse, SubmitResult, TxInfo,
};
use async_trait::async_trait;
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as Json};
use std::time::{Duration, Instant};
use url::Url;

/// Request timeout when none is configured.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`NodeClient`].
#[derive(Debug)]
pub struct NodeClientBuilder {
    url: Url,
    timeout: Duration,
    hooks: RpcClientHooks,
    http_client: Option<Client>,
}

impl NodeClientBuilder {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_HTTP_TIMEOUT,
            hooks: RpcClientHooks::default(),
            http_client: None,
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: RpcClientHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Reuses an existing HTTP client; its own timeout settings apply.
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Http` if the HTTP client cannot be constructed.
    pub fn build(self) -> RpcResult<NodeClient> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| RpcError::http(self.url.as_str(), e.to_string()))?,
        };
        Ok(NodeClient {
            base_address: self.url,
            http_client,
            request_timeout: self.timeout,
            hooks: self.hooks,
        })
    }
}

/// Node client speaking JSON-RPC 2.0 over HTTP POST.
#[derive(Debug, Clone)]
pub struct NodeClient {
    base_address: Url,
    http_client: Client,
    request_timeout: Duration,
    hooks: RpcClientHooks,
}

impl NodeClient {
    /// Creates a configurable builder.
    #[must_use]
    pub fn builder(url: Url) -> NodeClientBuilder {
        NodeClientBuilder::new(url)
    }

    /// Node endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.base_address
    }

    fn as_rpc_response(method: &str, content: &str) -> RpcResult<RpcResponse> {
        let response: RpcResponse = serde_json::from_str(content).map_err(|e| {
            RpcError::invalid_response(format!("{method}: malformed response: {e}"))
        })?;
        if let Some(error) = &response.error {
            return Err(RpcError::server(error.code, error.message.clone()));
        }
        Ok(response)
    }

    /// Sends one request and returns the raw `result` (possibly `null`).
    ///
    /// # Errors
    ///
    /// `RpcError::Server` for JSON-RPC errors, `Http`/`Timeout` for transport
    /// failures, `InvalidResponse` for malformed envelopes.
    pub async fn rpc_send(&self, method: &str, params: Vec<Json>) -> RpcResult<Json> {
        let request = RpcRequest::new(method, params);
        let start = Instant::now();

        let result: RpcResult<Json> = async {
            let response = self
                .http_client
                .post(self.base_address.clone())
                .header("Content-Type", "application/json")
                .body(serde_json::to_string(&request)?)
                .send()
                .await
                .map_err(|e| RpcError::from_reqwest(method, &e))?;

            let content = response
                .text()
                .await
                .map_err(|e| RpcError::from_reqwest(method, &e))?;

            Ok(Self::as_rpc_response(method, &content)?
                .result
                .unwrap_or(Json::Null))
        }
        .await;

        self.hooks.notify(&RpcRequestOutcome {
            method: method.to_string(),
            elapsed: start.elapsed(),
            success: result.is_ok(),
            timeout: self.request_timeout,
            error_code: result.as_ref().err().map(|e| e.code().unwrap_or(codes::INTERNAL_ERROR)),
        });

        result
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: Vec<Json>) -> RpcResult<T> {
        let result = self.rpc_send(method, params).await?;
        parse_result(method, result)
    }

    /// Like `rpc_call`, mapping the given "not found" code to `None`.
    async fn rpc_call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Json>,
        not_found: i64,
    ) -> RpcResult<Option<T>> {
        match self.rpc_send(method, params).await {
            Ok(Json::Null) => Ok(None),
            Ok(result) => parse_result(method, result).map(Some),
            Err(err) if err.code() == Some(not_found) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn parse_result<T: DeserializeOwned>(method: &str, result: Json) -> RpcResult<T> {
    serde_json::from_value(result)
        .map_err(|e| RpcError::invalid_response(format!("{method}: unexpected result: {e}")))
}

#[async_trait]
impl NodeApi for NodeClient {
    async fn status(&self) -> RpcResult<NodeStatus> {
        self.rpc_call("getstatus", vec![]).await
    }

    async fn account(&self, id: &AccountAddress) -> RpcResult<Option<AccountInfo>> {
        self.rpc_call_optional("getaccount", vec![json!(id)], codes::UNKNOWN_ACCOUNT)
            .await
    }

    async fn contract(&self, id: &ContractAddress) -> RpcResult<Option<ContractInfo>> {
        self.rpc_call_optional("getcontract", vec![json!(id)], codes::UNKNOWN_CONTRACT)
            .await
    }

    async fn contract_code(&self, id: &ContractAddress) -> RpcResult<EncodedBytes> {
        let code: ContractCode = self.rpc_call("getcontractcode", vec![json!(id)]).await?;
        Ok(code.bytecode)
    }

    async fn send_transaction(&self, tx: &EncodedBytes) -> RpcResult<TxHash> {
        let submitted: SubmitResult = self.rpc_call("sendtransaction", vec![json!(tx)]).await?;
        Ok(submitted.tx_hash)
    }

    async fn transaction_info(&self, hash: &TxHash) -> RpcResult<Option<TxInfo>> {
        let result = self.rpc_send("gettransactioninfo", vec![json!(hash)]).await?;
        if result.is_null() {
            return Ok(None);
        }
        parse_result("gettransactioninfo", result).map(Some)
    }

    async fn dry_run(&self, request: &DryRunRequest) -> RpcResult<DryRunResult> {
        self.rpc_call("dryrun", vec![serde_json::to_value(request)?])
            .await
    }
}
