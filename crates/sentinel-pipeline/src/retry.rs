//! Retry, rate limiting and cancellation
//!
//! Every external call is wrapped in a bounded timeout and a bounded
//! exponential backoff with jitter. The rate limiter spaces model calls
//! to respect the externally imposed ceiling; the cancellation flag is
//! checked between pipeline stages.

use crate::external::ExternalError;
use rand::Rng;
use sentinel_diagnosis::ModelError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Error classification for the retry loop
pub trait Retryable: Sized + std::fmt::Display {
    /// Whether a retry could plausibly succeed
    fn is_retryable(&self) -> bool;
    /// Construct the error representing an elapsed call timeout
    fn timed_out(after: Duration) -> Self;
}

impl Retryable for ExternalError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn timed_out(after: Duration) -> Self {
        Self::Transient(format!("call timed out after {}s", after.as_secs()))
    }
}

impl Retryable for ModelError {
    fn is_retryable(&self) -> bool {
        ModelError::is_retryable(self)
    }

    fn timed_out(after: Duration) -> Self {
        Self::Transient(format!("call timed out after {}s", after.as_secs()))
    }
}

/// Bounded exponential backoff with jitter, plus a per-call timeout
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Ceiling for the backoff delay
    pub max_delay: Duration,
    /// Timeout applied to each individual call
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the given retry (1-based), with jitter
    fn delay_for(&self, retry: u32) -> Duration {
        let exp = self.initial_delay.saturating_mul(2u32.saturating_pow(retry - 1));
        let capped = exp.min(self.max_delay);
        // Up to 25% jitter so synchronized callers fan out.
        let jitter_ms = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX) / 4;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        capped + Duration::from_millis(jitter)
    }

    /// Run an operation under this policy
    ///
    /// Retries only errors the [`Retryable`] impl marks transient; the
    /// last error is returned once attempts are exhausted.
    ///
    /// # Errors
    ///
    /// Returns the operation's terminal error, or its last transient
    /// error after `max_attempts`.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1u32;
        loop {
            let result = match tokio::time::timeout(self.call_timeout, f()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(self.call_timeout)),
            };
            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Spaces calls to respect a per-minute ceiling
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: tokio::sync::Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Allow at most `calls` per minute, evenly spaced
    #[must_use]
    pub fn per_minute(calls: u32) -> Self {
        let calls = calls.max(1);
        Self {
            interval: Duration::from_secs(60) / calls,
            next_slot: tokio::sync::Mutex::new(None),
        }
    }

    /// Wait until the next call slot opens
    pub async fn acquire(&self) {
        let mut next = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = next.map_or(now, |n| n.max(now));
        *next = Some(slot + self.interval);
        drop(next);
        tokio::time::sleep_until(slot).await;
    }
}

/// Cooperative cancellation checked between pipeline stages
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Fresh, un-cancelled flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the in-flight run
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
