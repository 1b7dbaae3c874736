//! Raw failure telemetry
//!
//! `FailureEvent` mirrors one row of the platform's task-history feed.
//! Events are produced by the external failure source and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal state reported by the task-history feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Task run succeeded
    Succeeded,
    /// Task run failed; only these are investigated
    Failed,
    /// Task run was skipped by the scheduler
    Skipped,
    /// Task run was cancelled
    Cancelled,
}

/// One raw task-failure occurrence from the telemetry feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Task name as reported by the platform
    pub task_name: String,
    /// Terminal state of the run
    pub state: TaskState,
    /// Platform error code, if any
    pub error_code: Option<String>,
    /// Error message text
    pub error_message: String,
    /// When the run was scheduled
    pub scheduled_time: DateTime<Utc>,
    /// When the run completed (failed)
    pub completed_time: Option<DateTime<Utc>>,
    /// Wall-clock execution time in seconds
    pub execution_time_seconds: f64,
    /// Warehouse size the run executed on (free-form tier label)
    pub warehouse_size: String,
    /// Opaque reference to the failing statement in the query history
    pub query_reference: String,
}

impl FailureEvent {
    /// Whether this event should enter the pipeline at all
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.state == TaskState::Failed
    }

    /// Whether the task name is usable as an identity key
    #[must_use]
    pub fn has_valid_task_name(&self) -> bool {
        !self.task_name.trim().is_empty()
    }
}
