//! Network configuration for node RPC and sidecar endpoints.
//!
//! This module provides configuration for connecting to relay chains
//! (Polkadot, Kusama) or a custom network through a node's JSON-RPC
//! interface and a REST sidecar.

use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Polkadot relay chain
    Polkadot,
    /// Kusama relay chain
    Kusama,
    /// Custom network with user-defined endpoints
    Custom,
}

impl Network {
    /// Get the SS58 address prefix
    pub fn ss58_prefix(&self) -> u16 {
        match self {
            Network::Polkadot => 0,
            Network::Kusama => 2,
            Network::Custom => 42,
        }
    }

    /// Get the default node RPC URL for this network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Polkadot => "https://rpc.polkadot.io",
            Network::Kusama => "https://kusama-rpc.polkadot.io",
            Network::Custom => "",
        }
    }

    /// Get the default sidecar URL for this network
    pub fn default_sidecar_url(&self) -> &'static str {
        match self {
            Network::Polkadot => "https://polkadot-public-sidecar.parity-chains.parity.io",
            Network::Kusama => "https://kusama-public-sidecar.parity-chains.parity.io",
            Network::Custom => "",
        }
    }
}

/// Configuration for chain query clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network to connect to
    pub network: Network,

    /// Node JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Sidecar REST endpoint URL
    pub sidecar_url: String,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Maximum number of retries for failed requests
    pub max_retries: usize,

    /// Initial retry delay (in milliseconds)
    pub retry_initial_delay_ms: u64,

    /// Maximum retry delay (in milliseconds)
    pub retry_max_delay_ms: u64,

    /// Retry backoff multiplier
    pub retry_multiplier: f64,

    /// Best block polling interval (in milliseconds)
    pub block_poll_interval_ms: u64,

    /// Block monitor timeout (in seconds)
    pub monitor_timeout_secs: u64,
}

impl ChainConfig {
    /// Create a new configuration for the specified network
    pub fn new(network: Network) -> Self {
        Self::with_endpoints(
            network,
            network.default_rpc_url().to_string(),
            network.default_sidecar_url().to_string(),
        )
    }

    fn with_endpoints(network: Network, rpc_url: String, sidecar_url: String) -> Self {
        Self {
            network,
            rpc_url,
            sidecar_url,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_initial_delay_ms: 100,
            retry_max_delay_ms: 5000,
            retry_multiplier: 2.0,
            block_poll_interval_ms: 6000,
            monitor_timeout_secs: 600,
        }
    }

    /// Create configuration for Polkadot
    pub fn polkadot() -> Self {
        Self::new(Network::Polkadot)
    }

    /// Create configuration for Kusama
    pub fn kusama() -> Self {
        Self::new(Network::Kusama)
    }

    /// Create a custom configuration
    pub fn custom(rpc_url: String, sidecar_url: String) -> Result<Self> {
        let config = Self::with_endpoints(Network::Custom, rpc_url, sidecar_url);
        config.validate_endpoints()?;
        Ok(config)
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set maximum retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set retry delays
    pub fn with_retry_config(
        mut self,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        self.retry_initial_delay_ms = initial_delay_ms;
        self.retry_max_delay_ms = max_delay_ms;
        self.retry_multiplier = multiplier;
        self
    }

    /// Set block monitor configuration
    pub fn with_monitor_config(mut self, poll_interval_ms: u64, timeout_secs: u64) -> Self {
        self.block_poll_interval_ms = poll_interval_ms;
        self.monitor_timeout_secs = timeout_secs;
        self
    }

    fn validate_endpoints(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(ChainError::ConfigError(
                "Node RPC URL cannot be empty".to_string(),
            ));
        }
        if self.sidecar_url.is_empty() {
            return Err(ChainError::ConfigError(
                "Sidecar URL cannot be empty".to_string(),
            ));
        }
        url::Url::parse(&self.rpc_url)?;
        url::Url::parse(&self.sidecar_url)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_endpoints()?;

        let violations = [
            (self.max_retries == 0, "max_retries must be at least 1"),
            (self.retry_initial_delay_ms == 0, "retry_initial_delay_ms must be positive"),
            (
                self.retry_max_delay_ms < self.retry_initial_delay_ms,
                "retry_max_delay_ms must not be below retry_initial_delay_ms",
            ),
            (self.retry_multiplier <= 1.0, "retry_multiplier must exceed 1.0"),
            (self.block_poll_interval_ms == 0, "block_poll_interval_ms must be positive"),
            (self.monitor_timeout_secs == 0, "monitor_timeout_secs must be positive"),
        ];
        match violations.iter().find(|(violated, _)| *violated) {
            Some((_, reason)) => Err(ChainError::ConfigError(reason.to_string())),
            None => Ok(()),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::polkadot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_prefixes() {
        assert_eq!(Network::Polkadot.ss58_prefix(), 0);
        assert_eq!(Network::Kusama.ss58_prefix(), 2);
    }

    #[test]
    fn test_polkadot_config() {
        let config = ChainConfig::polkadot();
        assert_eq!(config.network, Network::Polkadot);
        assert_eq!(config.rpc_url, "https://rpc.polkadot.io");
        assert!(config.sidecar_url.contains("polkadot"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kusama_config() {
        let config = ChainConfig::kusama();
        assert_eq!(config.network, Network::Kusama);
        assert!(config.rpc_url.contains("kusama"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = ChainConfig::custom(
            "http://127.0.0.1:9944".to_string(),
            "http://127.0.0.1:8080".to_string(),
        )
        .unwrap();

        assert_eq!(config.network, Network::Custom);
        assert_eq!(config.sidecar_url, "http://127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config_rejects_bad_urls() {
        let empty = ChainConfig::custom("".to_string(), "http://127.0.0.1:8080".to_string());
        assert!(matches!(empty, Err(ChainError::ConfigError(_))));

        let malformed =
            ChainConfig::custom("not a url".to_string(), "http://127.0.0.1:8080".to_string());
        assert!(matches!(malformed, Err(ChainError::UrlParseError(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = ChainConfig::kusama()
            .with_request_timeout(Duration::from_secs(60))
            .with_max_retries(5)
            .with_retry_config(200, 10000, 2.5)
            .with_monitor_config(3000, 120);

        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_initial_delay_ms, 200);
        assert_eq!(config.retry_max_delay_ms, 10000);
        assert_eq!(config.retry_multiplier, 2.5);
        assert_eq!(config.block_poll_interval_ms, 3000);
        assert_eq!(config.monitor_timeout_secs, 120);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChainConfig::polkadot();
        assert!(config.validate().is_ok());

        config.max_retries = 0;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.retry_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.retry_multiplier = 2.0;
        config.block_poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
