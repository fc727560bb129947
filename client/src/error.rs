//! Error types for the chain query client.
//!
//! This module defines the errors that can occur while querying a node's
//! JSON-RPC interface or a REST sidecar.

use thiserror::Error;

/// Main error type for chain query operations
#[derive(Error, Debug)]
pub enum ChainError {
    /// Error returned by the node JSON-RPC interface
    #[error("Node RPC error: {0}")]
    RpcError(String),

    /// Error returned by the sidecar
    #[error("Sidecar error: {0}")]
    SidecarError(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Dispatchable missing from the runtime metadata
    #[error("Unknown call: {section}.{method}")]
    UnknownCall {
        /// Pallet name
        section: String,
        /// Dispatchable name
        method: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {0} seconds")]
    RateLimitExceeded(u64),

    /// Max retries exceeded
    #[error("Max retries ({attempts}) exceeded: {last_error}")]
    MaxRetriesExceeded {
        /// Retries attempted
        attempts: usize,
        /// Last error encountered
        last_error: String,
    },

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Block monitor gave up
    #[error("Timed out after {0} seconds waiting for block")]
    MonitorTimeout(u64),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

/// Result type alias for chain query operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Error context for retryable operations
#[derive(Debug, Clone, Default)]
pub struct RetryContext {
    /// Number of failed attempts
    pub attempts: usize,
    /// Last error encountered
    pub last_error: String,
    /// Total time spent waiting between attempts (in milliseconds)
    pub total_delay_ms: u64,
}

impl RetryContext {
    /// Create a new retry context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt and the delay before the next one
    pub fn record_attempt(&mut self, error: &ChainError, delay_ms: u64) {
        self.attempts += 1;
        self.last_error = error.to_string();
        self.total_delay_ms += delay_ms;
    }

    /// Convert into the error reported once retries are exhausted
    pub fn exhausted(self, last: &ChainError) -> ChainError {
        ChainError::MaxRetriesExceeded {
            attempts: self.attempts,
            last_error: last.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::SidecarError("Status 500: boom".to_string());
        assert_eq!(err.to_string(), "Sidecar error: Status 500: boom");

        let err = ChainError::UnknownCall {
            section: "balances".to_string(),
            method: "transferAll".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown call: balances.transferAll");
    }

    #[test]
    fn test_retry_context() {
        let mut ctx = RetryContext::new();
        assert_eq!(ctx.attempts, 0);

        ctx.record_attempt(&ChainError::RpcError("first".to_string()), 100);
        assert_eq!(ctx.attempts, 1);
        assert_eq!(ctx.last_error, "Node RPC error: first");
        assert_eq!(ctx.total_delay_ms, 100);

        ctx.record_attempt(&ChainError::RateLimitExceeded(1), 200);
        assert_eq!(ctx.attempts, 2);
        assert_eq!(ctx.total_delay_ms, 300);

        let err = ctx.exhausted(&ChainError::RateLimitExceeded(1));
        assert!(matches!(
            err,
            ChainError::MaxRetriesExceeded { attempts: 2, .. }
        ));
    }
}
