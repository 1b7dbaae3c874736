//! Governed model access
//!
//! Wraps any [`ModelClient`] with the run's rate ceiling and the
//! transient-failure retry policy, so the diagnosis engine stays unaware
//! of either. One `acquire` per attempt keeps the spend ceiling honest
//! even across malformed-response retries.

use crate::retry::{RateLimiter, RetryPolicy};
use async_trait::async_trait;
use sentinel_diagnosis::{ModelClient, ModelError};
use std::sync::Arc;

/// Rate-limited, retrying decorator over a model client
pub struct GovernedModelClient {
    inner: Arc<dyn ModelClient>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl GovernedModelClient {
    /// Wrap a client with a rate limiter and retry policy
    #[must_use]
    pub fn new(inner: Arc<dyn ModelClient>, limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self {
            inner,
            limiter,
            retry,
        }
    }
}

#[async_trait]
impl ModelClient for GovernedModelClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.limiter.acquire().await;
        self.retry
            .run("model.complete", || self.inner.complete(prompt))
            .await
    }
}
