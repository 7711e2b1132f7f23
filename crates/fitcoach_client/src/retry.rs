use rand::{RngExt, rng};
use std::time::Duration;

use crate::FitcoachError;

/// Exponential backoff with jitter for idempotent store reads.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Retry `f` while `retryable` accepts the error and attempts remain.
    pub async fn retry_async_if<F, Fut, T, E, P>(&self, mut f: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !retryable(&e) {
                        return Err(e);
                    }
                    let max_delay = self.base_delay * (1u32 << attempt.min(16));
                    let max_ms = max_delay.as_millis() as u64;
                    let jitter = if max_ms == 0 {
                        0
                    } else {
                        rng().random_range(0..max_ms)
                    };
                    tracing::debug!(attempt, delay_ms = jitter, "retrying store request");
                    tokio::time::sleep(Duration::from_millis(jitter)).await;
                }
            }
        }
    }

    pub async fn retry_async<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.retry_async_if(f, |_| true).await
    }
}

impl FitcoachError {
    /// Transport failures and 5xx/429 responses are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FitcoachError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FitcoachError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
