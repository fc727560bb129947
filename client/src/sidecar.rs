//! Sidecar REST client for decoded chain storage.
//!
//! This module provides a client for a REST sidecar in front of the node,
//! which serves decoded storage items (multisig operations, proxy
//! announcements) and runtime metadata (dispatchables).

use crate::config::ChainConfig;
use crate::error::{ChainError, Result};
use crate::retry::RetryStrategy;
use crate::rpc::retry_after;
use crate::types::{AnnouncementsStorage, DispatchableResponse, MultisigStorage, StorageResponse};
use multiproxy_engine::{Address, CallHash, MultisigInfo, ProxyAnnouncement};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

/// Sidecar REST client
#[derive(Clone)]
pub struct SidecarClient {
    /// HTTP client
    client: Client,
    /// Sidecar base URL
    base_url: Url,
    /// Retry strategy
    retry_strategy: RetryStrategy,
}

impl SidecarClient {
    /// Create a new sidecar client
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ChainError::NetworkError)?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.sidecar_url)?,
            retry_strategy: RetryStrategy::from_config(config),
        })
    }

    fn endpoint(&self, segments: &[&str], keys: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ChainError::ConfigError("Sidecar URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !keys.is_empty() {
            let mut query = url.query_pairs_mut();
            for key in keys {
                query.append_pair("keys[]", key);
            }
        }
        Ok(url)
    }

    /// GET a JSON document, mapping 404 to `NotFound`
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        self.retry_strategy
            .retry(|| async {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(ChainError::NetworkError)?;

                let status = response.status();
                if status.is_success() {
                    response
                        .json()
                        .await
                        .map_err(|e| ChainError::InvalidResponse(e.to_string()))
                } else if status == StatusCode::NOT_FOUND {
                    Err(ChainError::NotFound(url.path().to_string()))
                } else if status == StatusCode::TOO_MANY_REQUESTS {
                    Err(ChainError::RateLimitExceeded(retry_after(&response)))
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    Err(ChainError::SidecarError(format!(
                        "Status {}: {}",
                        status, error_text
                    )))
                }
            })
            .await
    }

    /// Pending operation for `call_hash` at `multisig`, if any
    pub async fn multisig_info(
        &self,
        multisig: &Address,
        call_hash: &CallHash,
    ) -> Result<Option<MultisigInfo>> {
        debug!("Fetching multisig info for {} ({})", multisig, call_hash);

        let hash = call_hash.to_string();
        let url = self.endpoint(
            &["pallets", "multisig", "storage", "Multisigs"],
            &[multisig.as_str(), &hash],
        )?;
        let response: StorageResponse<MultisigStorage> = self.get_json(&url).await?;

        response.value.map(MultisigInfo::try_from).transpose()
    }

    /// Announcements made by `delegate`
    pub async fn proxy_announcements(&self, delegate: &Address) -> Result<Vec<ProxyAnnouncement>> {
        debug!("Fetching proxy announcements for {}", delegate);

        let url = self.endpoint(
            &["pallets", "proxy", "storage", "Announcements"],
            &[delegate.as_str()],
        )?;
        let response: StorageResponse<AnnouncementsStorage> = self.get_json(&url).await?;

        let announcements = match response.value {
            Some(storage) => storage.into_announcements()?,
            None => Vec::new(),
        };
        debug!(
            "Delegate {} has {} announcements at block {}",
            delegate,
            announcements.len(),
            response.at.height
        );
        Ok(announcements)
    }

    /// Verify the runtime exposes `section.method`.
    ///
    /// Argument bytes are not decoded; only the dispatchable's presence in
    /// the runtime metadata is checked.
    pub async fn check_call(&self, section: &str, method: &str, args: &[u8]) -> Result<()> {
        info!(
            "Checking call {}.{} ({} argument bytes)",
            section,
            method,
            args.len()
        );

        let url = self.endpoint(&["pallets", section, "dispatchables", method], &[])?;
        match self.get_json::<DispatchableResponse>(&url).await {
            Ok(dispatchable) => {
                debug!(
                    "Dispatchable {}.{} found in pallet {}",
                    section, method, dispatchable.pallet_index
                );
                Ok(())
            }
            Err(ChainError::NotFound(_)) => Err(ChainError::UnknownCall {
                section: section.to_string(),
                method: method.to_string(),
            }),
            Err(ChainError::SidecarError(msg)) if msg.starts_with("Status 400") => {
                Err(ChainError::UnknownCall {
                    section: section.to_string(),
                    method: method.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Health check - verify the sidecar can reach its node
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Performing sidecar health check");

        let url = self.endpoint(&["node", "version"], &[])?;
        match self.get_json::<serde_json::Value>(&url).await {
            Ok(version) => {
                info!(
                    "Sidecar health check passed (node: {})",
                    version["clientVersion"].as_str().unwrap_or("unknown")
                );
                Ok(true)
            }
            Err(e) => {
                error!("Sidecar health check failed: {:?}", e);
                Err(e)
            }
        }
    }
}
