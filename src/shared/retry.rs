//! Exponential backoff for store operations.
//!
//! Every error is retried the same way; the executor does not tell
//! transient faults apart from logical conflicts.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::core::config::IngestionConfig;

/// How many times to run an operation and how long to wait in between.
///
/// Values are taken as given: `attempts == 0` runs once and a zero
/// `base_delay` retries without waiting. Configured defaults are not
/// substituted for zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub attempts: u32,
    /// Delay before the second attempt; doubles each time after that
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        IngestionConfig::default().into()
    }
}

impl From<IngestionConfig> for RetryPolicy {
    fn from(config: IngestionConfig) -> Self {
        Self {
            attempts: config.max_retries,
            base_delay: config.retry_backoff,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Wait after the failed attempt at `attempt_index` (zero-based): `base * 2^index`
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt_index);
        self.base_delay.saturating_mul(factor)
    }

    /// Zero attempts still runs the operation once.
    fn effective_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

/// Run `operation` until it succeeds or the policy's attempts run out.
///
/// The error of the final attempt is returned as-is.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.effective_attempts();
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 >= attempts => {
                tracing::debug!("Giving up after {} attempt(s): {}", attempts, err);
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
