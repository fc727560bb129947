//! Node JSON-RPC client.
//!
//! This module provides a client for a node's JSON-RPC interface, used for
//! block height queries and node health.

use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::retry::RetryStrategy;
use crate::types::{BlockHeader, SystemHealth};
use multiproxy_engine::BlockNumber;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// JSON-RPC request ID type
type RequestId = u64;

/// Node JSON-RPC client
#[derive(Clone)]
pub struct NodeRpcClient {
    /// HTTP client
    client: Client,
    /// Node RPC URL
    base_url: String,
    /// Retry strategy
    retry_strategy: RetryStrategy,
    /// Request ID counter
    request_id: Arc<AtomicU64>,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: RequestId,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl NodeRpcClient {
    /// Create a new node RPC client
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ChainError::NetworkError)?;

        Ok(Self {
            client,
            base_url: config.rpc_url.clone(),
            retry_strategy: RetryStrategy::from_config(config),
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    fn next_request_id(&self) -> RequestId {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Make a JSON-RPC call and decode its result
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.call_rpc(method, params).await?;
        serde_json::from_value(result).map_err(ChainError::SerializationError)
    }

    async fn call_rpc(&self, method: &str, params: Value) -> Result<Value> {
        let request_id = self.next_request_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: request_id,
            method,
            params: &params,
        };

        debug!("Node RPC request: {} (id: {})", method, request_id);

        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .post(&self.base_url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(ChainError::NetworkError)?;

                let status = response.status();
                if status.as_u16() == 429 {
                    return Err(ChainError::RateLimitExceeded(retry_after(&response)));
                }
                if !status.is_success() {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(ChainError::RpcError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }

                let rpc_response: JsonRpcResponse = response
                    .json()
                    .await
                    .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

                if let Some(error) = rpc_response.error {
                    error!("Node RPC error: {} (code: {})", error.message, error.code);
                    return Err(ChainError::RpcError(format!(
                        "{} (code: {})",
                        error.message, error.code
                    )));
                }

                rpc_response.result.ok_or_else(|| {
                    ChainError::RpcError("Missing result in response".to_string())
                })
            })
            .await
    }

    /// Get the best block header
    pub async fn best_header(&self) -> Result<BlockHeader> {
        self.call("chain_getHeader", json!([])).await
    }

    /// Get the best block number
    pub async fn best_block_number(&self) -> Result<BlockNumber> {
        let number = self.best_header().await?.block_number()?;
        debug!("Best block: {}", number);
        Ok(number)
    }

    /// Get the latest finalized block number
    pub async fn finalized_block_number(&self) -> Result<BlockNumber> {
        let hash: String = self.call("chain_getFinalizedHead", json!([])).await?;
        let header: BlockHeader = self.call("chain_getHeader", json!([hash])).await?;
        let number = header.block_number()?;
        debug!("Finalized block: {} ({})", number, hash);
        Ok(number)
    }

    /// Get node health
    pub async fn system_health(&self) -> Result<SystemHealth> {
        self.call("system_health", json!([])).await
    }

    /// Health check - verify the node is reachable and not major-syncing
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Performing node RPC health check");

        match self.system_health().await {
            Ok(health) => {
                info!(
                    "Node RPC health check passed (peers: {}, syncing: {})",
                    health.peers, health.is_syncing
                );
                Ok(!health.is_syncing)
            }
            Err(e) => {
                error!("Node RPC health check failed: {:?}", e);
                Err(e)
            }
        }
    }
}

/// Seconds to wait from a `Retry-After` header, defaulting to one
pub(crate) fn retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}
