//! Retry logic for chain queries.
//!
//! This module provides utilities for retrying failed queries with
//! exponential backoff and classifying which failures are transient.

use crate::config::ChainConfig;
use crate::error::{ChainError, Result, RetryContext};
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry strategy configuration
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of retries
    pub max_retries: usize,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl RetryStrategy {
    /// Create a new retry strategy from chain config
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            multiplier: config.retry_multiplier,
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(self.multiplier)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Check if an error is retryable
    pub fn is_retryable(error: &ChainError) -> bool {
        match error {
            ChainError::NetworkError(_) => true,
            ChainError::RateLimitExceeded(_) => true,
            // 5xx from either endpoint
            ChainError::RpcError(msg) | ChainError::SidecarError(msg) => {
                msg.contains("500") || msg.contains("502") || msg.contains("503")
            }
            // A node still syncing may serve truncated payloads
            ChainError::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// Delay before the next attempt, honouring a server's `Retry-After`
    fn next_delay(&self, backoff: &mut ExponentialBackoff, error: &ChainError) -> Option<Duration> {
        match error {
            ChainError::RateLimitExceeded(secs) if *secs > 0 => {
                Some(Duration::from_secs(*secs).min(self.max_delay))
            }
            _ => backoff.next_backoff(),
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. Exhaustion is reported as `MaxRetriesExceeded`.
    pub async fn retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.create_backoff();
        let mut ctx = RetryContext::new();

        for attempt in 0..=self.max_retries {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Query recovered on attempt {}", attempt + 1);
                    }
                    return Ok(value);
                }
                Err(e) if !Self::is_retryable(&e) => return Err(e),
                Err(e) => e,
            };

            if attempt == self.max_retries {
                warn!("Giving up after {} retries: {}", ctx.attempts, error);
                return Err(ctx.exhausted(&error));
            }

            let Some(delay) = self.next_delay(&mut backoff, &error) else {
                warn!("Backoff exhausted: {}", error);
                return Err(ctx.exhausted(&error));
            };
            ctx.record_attempt(&error, delay.as_millis() as u64);
            debug!(
                "Retry {}/{} in {:?} after: {}",
                ctx.attempts, self.max_retries, delay, error
            );
            tokio::time::sleep(delay).await;
        }

        Err(ChainError::MaxRetriesExceeded {
            attempts: ctx.attempts,
            last_error: ctx.last_error,
        })
    }
}
