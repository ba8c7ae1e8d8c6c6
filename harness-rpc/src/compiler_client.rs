//! REST client for the compiler service.

use crate::api::CompilerApi;
use crate::error::{RpcError, RpcResult};
use crate::hooks::{RpcClientHooks, RpcRequestOutcome};
use crate::models::{CompileOutput, CompilerMessage, ReturnType};
use crate::node_client::DEFAULT_HTTP_TIMEOUT;
use crate::source::SourceUnit;
use async_trait::async_trait;
use harness_primitives::EncodedBytes;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as Json};
use std::time::{Duration, Instant};
use url::Url;

/// Compiler HTTP client.
#[derive(Debug, Clone)]
pub struct CompilerClient {
    base_address: Url,
    http_client: Client,
    request_timeout: Duration,
    hooks: RpcClientHooks,
}

/// Builder for [`CompilerClient`].
#[derive(Debug)]
pub struct CompilerClientBuilder {
    url: Url,
    timeout: Duration,
    hooks: RpcClientHooks,
}

impl CompilerClientBuilder {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_HTTP_TIMEOUT,
            hooks: RpcClientHooks::default(),
        }
    }

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

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Http` if the HTTP client cannot be constructed.
    pub fn build(self) -> RpcResult<CompilerClient> {
        let http_client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RpcError::http(self.url.as_str(), e.to_string()))?;

        // endpoints are joined onto the base path
        let mut base_address = self.url;
        if !base_address.path().ends_with('/') {
            let path = format!("{}/", base_address.path());
            base_address.set_path(&path);
        }

        Ok(CompilerClient {
            base_address,
            http_client,
            request_timeout: self.timeout,
            hooks: self.hooks,
        })
    }
}

#[derive(Deserialize)]
struct CalldataResponse {
    calldata: EncodedBytes,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
}

impl CompilerClient {
    #[must_use]
    pub fn builder(url: Url) -> CompilerClientBuilder {
        CompilerClientBuilder::new(url)
    }

    /// Compiler endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.base_address
    }

    fn endpoint(&self, path: &str) -> RpcResult<Url> {
        self.base_address
            .join(path)
            .map_err(|e| RpcError::invalid_params(format!("bad compiler path {path}: {e}")))
    }

    /// Issues one request. A 400 answer is parsed as compiler diagnostics.
    async fn request<T: DeserializeOwned>(&self, path: &str, body: Option<Json>) -> RpcResult<T> {
        let start = Instant::now();
        let mut status_code = None;

        let result: RpcResult<T> = async {
            let url = self.endpoint(path)?;
            let builder = match &body {
                Some(body) => self.http_client.post(url).json(body),
                None => self.http_client.get(url),
            };
            let response = builder
                .send()
                .await
                .map_err(|e| RpcError::from_reqwest(path, &e))?;

            let status = response.status();
            status_code = Some(i64::from(status.as_u16()));
            let content = response
                .text()
                .await
                .map_err(|e| RpcError::from_reqwest(path, &e))?;

            if status == StatusCode::BAD_REQUEST {
                let messages: Vec<CompilerMessage> = serde_json::from_str(&content)
                    .map_err(|_| RpcError::http(path, format!("400 Bad Request: {content}")))?;
                return Err(RpcError::Compile { messages });
            }
            if !status.is_success() {
                return Err(RpcError::http(path, format!("{status}: {content}")));
            }
            serde_json::from_str(&content)
                .map_err(|e| RpcError::invalid_response(format!("{path}: {e}")))
        }
        .await;

        self.hooks.notify(&RpcRequestOutcome {
            method: path.to_string(),
            elapsed: start.elapsed(),
            success: result.is_ok(),
            timeout: self.request_timeout,
            error_code: if result.is_ok() { None } else { status_code },
        });

        result
    }
}

fn options(source: SourceUnit<'_>) -> Json {
    json!({ "file_system": source.file_system })
}

#[async_trait]
impl CompilerApi for CompilerClient {
    async fn version(&self) -> RpcResult<String> {
        let response: VersionResponse = self.request("version", None).await?;
        Ok(response.version)
    }

    async fn compile(&self, source: SourceUnit<'_>) -> RpcResult<CompileOutput> {
        let body = json!({ "code": source.code, "options": options(source) });
        self.request("compile", Some(body)).await
    }

    async fn encode_calldata(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        arguments: &[String],
    ) -> RpcResult<EncodedBytes> {
        let body = json!({
            "source": source.code,
            "options": options(source),
            "function": function,
            "arguments": arguments,
        });
        match self.request::<CalldataResponse>("encode-calldata", Some(body)).await {
            Ok(response) => Ok(response.calldata),
            // argument errors come back as diagnostics
            Err(RpcError::Compile { messages }) => Err(RpcError::invalid_params(
                messages
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
            Err(err) => Err(err),
        }
    }

    async fn decode_call_result(
        &self,
        source: SourceUnit<'_>,
        function: &str,
        call_result: ReturnType,
        call_value: &EncodedBytes,
    ) -> RpcResult<Json> {
        let body = json!({
            "source": source.code,
            "options": options(source),
            "function": function,
            "call-result": call_result.as_str(),
            "call-value": call_value,
        });
        self.request("decode-call-result", Some(body)).await
    }
}
