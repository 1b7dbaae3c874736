//! Pipeline configuration
//!
//! Loaded from TOML with full defaults so an empty file is a valid
//! configuration. Builder methods cover the knobs tests and embedders
//! touch most.

use crate::error::PipelineError;
use crate::retry::RetryPolicy;
use sentinel_cost::CostConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one pipeline deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hours of task history each run looks back over
    pub lookback_hours: u32,
    /// Rate ceiling for model calls
    pub model_calls_per_minute: u32,
    /// Extra diagnosis attempts after a malformed response
    pub diagnosis_retries: u32,
    /// Attempts (including the first) for transient external failures
    pub max_transient_attempts: u32,
    /// Per-call timeout for external collaborators, seconds
    pub call_timeout_secs: u64,
    /// First backoff delay, milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, milliseconds
    pub max_backoff_ms: u64,
    /// Schedule assumed when a task does not declare one
    pub default_schedule: String,
    /// Cost estimator settings
    pub cost: CostConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            model_calls_per_minute: 10,
            diagnosis_retries: 2,
            max_transient_attempts: 3,
            call_timeout_secs: 60,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            default_schedule: "1 DAY".to_string(),
            cost: CostConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With lookback window
    #[inline]
    #[must_use]
    pub fn with_lookback_hours(mut self, hours: u32) -> Self {
        self.lookback_hours = hours;
        self
    }

    /// With model-call rate ceiling
    #[inline]
    #[must_use]
    pub fn with_model_calls_per_minute(mut self, calls: u32) -> Self {
        self.model_calls_per_minute = calls;
        self
    }

    /// With default task schedule
    #[inline]
    #[must_use]
    pub fn with_default_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.default_schedule = schedule.into();
        self
    }

    /// Retry policy for external collaborators, derived from the knobs
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_transient_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_backoff_ms),
            max_delay: Duration::from_millis(self.max_backoff_ms),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }

    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::Config`] on malformed TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, PipelineError> {
        toml::from_str(input).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::Config`] when the file cannot be read
    /// or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }
}
