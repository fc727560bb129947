//! Block height monitoring.
//!
//! This module polls the node's best block until a target height is
//! reached, e.g. the end of an announcement's delay window.

use crate::config::ChainConfig;
use crate::error::Result;
use crate::rpc::NodeRpcClient;
use multiproxy_engine::{AnnouncementWindow, BlockNumber};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Block monitor for waiting on chain height
#[derive(Clone)]
pub struct BlockMonitor {
    /// Node RPC client
    rpc: NodeRpcClient,
    /// Default monitoring options
    defaults: MonitorOptions,
}

/// Monitoring options
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    /// Poll interval (in milliseconds)
    pub poll_interval_ms: u64,
    /// Timeout (in seconds)
    pub timeout_secs: u64,
}

impl MonitorOptions {
    /// Create from chain config
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            poll_interval_ms: config.block_poll_interval_ms,
            timeout_secs: config.monitor_timeout_secs,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Block monitoring result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorResult {
    /// Target reached at the given best block
    Reached(BlockNumber),
    /// Gave up; carries the last block seen, if any
    Timeout(Option<BlockNumber>),
}

impl BlockMonitor {
    /// Create a new block monitor
    pub fn new(rpc: NodeRpcClient, config: &ChainConfig) -> Self {
        Self {
            rpc,
            defaults: MonitorOptions::from_config(config),
        }
    }

    /// Default options derived from configuration
    pub fn default_options(&self) -> MonitorOptions {
        self.defaults
    }

    /// Poll the best block until it reaches `target` or the timeout elapses
    pub async fn wait_for_block(
        &self,
        target: BlockNumber,
        options: MonitorOptions,
    ) -> Result<MonitorResult> {
        info!(
            "Waiting for block {} (timeout: {}s)",
            target, options.timeout_secs
        );

        let start = Instant::now();
        let timeout = Duration::from_secs(options.timeout_secs);
        let poll_interval = Duration::from_millis(options.poll_interval_ms);
        let mut last_seen = None;

        loop {
            match self.rpc.best_block_number().await {
                Ok(current) if current >= target => {
                    info!("Reached block {} (target {})", current, target);
                    return Ok(MonitorResult::Reached(current));
                }
                Ok(current) => {
                    debug!("At block {}, {} to go", current, target - current);
                    last_seen = Some(current);
                }
                Err(e) => {
                    debug!("Error fetching best block: {:?}", e);
                }
            }

            if start.elapsed() >= timeout {
                warn!(
                    "Block monitoring timed out waiting for {} (last seen: {:?})",
                    target, last_seen
                );
                return Ok(MonitorResult::Timeout(last_seen));
            }

            sleep(poll_interval).await;
        }
    }

    /// Wait until an announcement's delay has elapsed
    pub async fn wait_until_executable(&self, window: &AnnouncementWindow) -> Result<bool> {
        if window.is_elapsed() {
            return Ok(true);
        }
        let result = self.wait_for_block(window.end_block, self.defaults).await?;
        Ok(matches!(result, MonitorResult::Reached(_)))
    }
}
