//! Multiproxy Chain Query Client
//!
//! This library provides the chain-facing collaborator of the multiproxy
//! engine. It reads live facts (best block, pending multisig operations,
//! delayed-proxy announcements, runtime dispatchables) from a node's
//! JSON-RPC interface and a REST sidecar.
//!
//! # Features
//!
//! - **Node RPC Integration**: Best and finalized block height, node health
//! - **Sidecar Integration**: Decoded multisig and proxy storage, dispatchable metadata
//! - **Engine Integration**: Implements [`multiproxy_engine::ChainClient`]
//! - **Block Monitoring**: Poll until a target height, e.g. the end of an announcement delay
//! - **Retry Logic**: Exponential backoff for transient network errors
//! - **Network Support**: Polkadot, Kusama and custom networks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use multiproxy_client::{ChainConfig, ChainQueryClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tracing_subscriber::fmt::init();
//!
//!     let client = ChainQueryClient::new(Arc::new(ChainConfig::polkadot()))?;
//!     client.health_check().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Examples
//!
//! ## Resolve an announcement
//!
//! ```rust,no_run
//! use multiproxy_client::{ChainConfig, ChainQueryClient};
//! use multiproxy_engine::{AccountArena, AnnouncementResolver, Transaction};
//! use std::sync::Arc;
//!
//! # async fn run(arena: AccountArena, tx: Transaction) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChainQueryClient::new(Arc::new(ChainConfig::kusama()))?;
//! let resolver = AnnouncementResolver::new(client);
//!
//! let view = resolver.resolve(&tx, &arena, None).await?;
//! if let Some(window) = view.window {
//!     println!("{}: {} blocks remaining", view.status, window.blocks_remaining());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod monitor;
pub mod retry;
pub mod rpc;
pub mod sidecar;
pub mod types;

// Re-export commonly used types
pub use config::{ChainConfig, Network};
pub use error::{ChainError, Result};
pub use monitor::{BlockMonitor, MonitorOptions, MonitorResult};
pub use retry::RetryStrategy;
pub use rpc::NodeRpcClient;
pub use sidecar::SidecarClient;
pub use types::{BlockHeader, SystemHealth};

use async_trait::async_trait;
use multiproxy_engine::{
    Address, AnnouncementWindow, BlockNumber, CallHash, ChainClient, MultisigInfo,
    ProxyAnnouncement,
};
use std::sync::Arc;
use tracing::info;

/// Chain query client that combines node RPC, sidecar and block monitoring
/// into the engine's [`ChainClient`].
#[derive(Clone)]
pub struct ChainQueryClient {
    /// Node RPC client
    rpc: NodeRpcClient,
    /// Sidecar client
    sidecar: SidecarClient,
    /// Block monitor
    monitor: BlockMonitor,
    /// Configuration
    config: Arc<ChainConfig>,
}

impl ChainQueryClient {
    /// Create a new chain query client
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use multiproxy_client::{ChainConfig, ChainQueryClient};
    /// use std::sync::Arc;
    ///
    /// let client = ChainQueryClient::new(Arc::new(ChainConfig::polkadot())).unwrap();
    /// ```
    pub fn new(config: Arc<ChainConfig>) -> Result<Self> {
        config.validate()?;

        info!(
            "Initializing chain query client for network: {:?}",
            config.network
        );

        let rpc = NodeRpcClient::new(&config)?;
        let sidecar = SidecarClient::new(&config)?;
        let monitor = BlockMonitor::new(rpc.clone(), &config);

        Ok(Self {
            rpc,
            sidecar,
            monitor,
            config,
        })
    }

    /// Get the node RPC client
    pub fn rpc(&self) -> &NodeRpcClient {
        &self.rpc
    }

    /// Get the sidecar client
    pub fn sidecar(&self) -> &SidecarClient {
        &self.sidecar
    }

    /// Get the block monitor
    pub fn monitor(&self) -> &BlockMonitor {
        &self.monitor
    }

    /// Wait until an announcement's delay window has elapsed
    pub async fn wait_until_executable(&self, window: &AnnouncementWindow) -> Result<bool> {
        self.monitor.wait_until_executable(window).await
    }

    /// Health check - verify connectivity to the node and the sidecar
    pub async fn health_check(&self) -> Result<bool> {
        let (node_ok, sidecar_ok) =
            futures::try_join!(self.rpc.health_check(), self.sidecar.health_check())?;
        Ok(node_ok && sidecar_ok)
    }

    /// Get configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

#[async_trait]
impl ChainClient for ChainQueryClient {
    type Error = ChainError;

    async fn multisig_info(
        &self,
        multisig: &Address,
        call_hash: &CallHash,
    ) -> Result<Option<MultisigInfo>> {
        self.sidecar.multisig_info(multisig, call_hash).await
    }

    async fn proxy_announcements(&self, delegate: &Address) -> Result<Vec<ProxyAnnouncement>> {
        self.sidecar.proxy_announcements(delegate).await
    }

    async fn best_block_number(&self) -> Result<BlockNumber> {
        self.rpc.best_block_number().await
    }

    async fn check_call(&self, section: &str, method: &str, args: &[u8]) -> Result<()> {
        self.sidecar.check_call(section, method, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_config() -> Arc<ChainConfig> {
        Arc::new(
            ChainConfig::polkadot()
                .with_request_timeout(Duration::from_secs(10))
                .with_max_retries(1),
        )
    }

    #[test]
    fn test_chain_query_client_creation() {
        let client = ChainQueryClient::new(create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_config_access() {
        let config = create_test_config();
        let client = ChainQueryClient::new(config.clone()).unwrap();
        assert_eq!(client.config().network, config.network);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ChainConfig::polkadot();
        config.max_retries = 0;

        let result = ChainQueryClient::new(Arc::new(config));
        assert!(result.is_err());
    }
}
