// wallet-core/src/network/jsonrpc.rs
//
// JSON-RPC 2.0 over HTTP POST, shared by every chain client.
//
// Request : {"id", "jsonrpc": "2.0", "method", "params": [...]}
// Response: {"id", "jsonrpc", "result" | "error": {"code", "message"}}
//
// A populated `error` is a remote failure; a null or missing `result` is a
// successful void call.

use crate::config::NetworkConfig;
use crate::error::{RpcError, WalletError, WalletResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            id,
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// Decode a response body into `T`.
pub fn parse_response<T: DeserializeOwned>(method: &str, body: Value) -> WalletResult<T> {
    let response: JsonRpcResponse = serde_json::from_value(body).map_err(|e| RpcError::Decode {
        method: method.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(err) = response.error {
        return Err(RpcError::Remote {
            method: method.to_string(),
            code: err.code,
            message: err.message,
        }
        .into());
    }

    let result = response.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| {
        WalletError::Rpc(RpcError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })
    })
}

/// HTTP JSON-RPC client bound to one endpoint. Cheap to share behind `&`;
/// request ids come from an atomic counter.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: &NetworkConfig) -> WalletResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn request<'a>(&self, method: &'a str, params: Value) -> JsonRpcRequest<'a> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        JsonRpcRequest::new(id, method, params)
    }

    /// Call `method` with positional `params`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> WalletResult<T> {
        let request = self.request(method, params);
        debug!(method, id = request.id, endpoint = %self.endpoint, "jsonrpc request");

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method, error = %e, "jsonrpc transport failure");
            RpcError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                warn!(method, %status, "jsonrpc http error");
                return Err(RpcError::Transport(format!("HTTP {}: {}", status, e)).into());
            }
            Err(e) => {
                return Err(RpcError::Decode {
                    method: method.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        parse_response(method, body).map_err(|e| {
            warn!(method, id = request.id, error = %e, "jsonrpc call failed");
            e
        })
    }
}
