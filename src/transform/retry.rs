//! Retry policy for transform calls.
//!
//! Exponential backoff from a base wait up to a ceiling, with jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use super::error::TransformError;
use crate::config::RetryConfig;

/// Resolved retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Per-attempt deadline, `None` for unbounded
    pub timeout: Option<Duration>,
    pub base_wait: Duration,
    pub max_wait: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            timeout: None,
            base_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before retry number `attempt` (0-based), never above `max_wait`
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base_ms = self.base_wait.as_millis() as u64;
        let max_ms = self.max_wait.as_millis() as u64;
        let capped_ms = base_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(max_ms);

        let final_ms = if self.jitter && capped_ms > 0 {
            let jitter = rand::rng().random_range(0..=capped_ms / 4);
            capped_ms.saturating_add(jitter).min(max_ms)
        } else {
            capped_ms
        };

        Duration::from_millis(final_ms)
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, TransformError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransformError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let wait = self.backoff_duration(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Transform attempt failed, retrying"
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.count,
            timeout: (config.timeout > 0).then(|| Duration::from_secs(config.timeout)),
            base_wait: Duration::from_secs(config.wait),
            max_wait: Duration::from_secs(config.max_wait.max(config.wait)),
            jitter: true,
        }
    }
}
