//! Retry with linearly increasing backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::metrics::UPSTREAM_RETRIES_TOTAL;

/// Retry policy for upstream fetches
///
/// The delay after failed attempt `n` (1-based) is `base_delay * n`, so the
/// default policy waits 1s, then 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the given failed attempt, capped at `Duration::MAX`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `operation` until it succeeds or attempts run out
    ///
    /// `operation` receives the 1-based attempt number. The error of the
    /// final attempt is returned when every attempt fails.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => {
                    tracing::error!(
                        label,
                        attempts = attempt,
                        %error,
                        "All attempts failed"
                    );
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "Attempt failed, retrying"
                    );
                    UPSTREAM_RETRIES_TOTAL.inc();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
