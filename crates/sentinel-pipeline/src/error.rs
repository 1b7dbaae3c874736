//! Error types for the pipeline
//!
//! Errors are scoped per incident; the orchestrator folds them into the
//! investigation's terminal state and the run counters. Only a failure
//! source that stays unreachable aborts a whole run.

use crate::external::ExternalError;
use sentinel_approval::ApprovalError;
use sentinel_diagnosis::DiagnosisError;
use sentinel_model::IllegalTransition;

/// Per-incident pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Statement text or schema could not be resolved; the investigation
    /// is closed, not failed
    #[error("context unavailable: {0}")]
    ContextUnavailable(String),

    /// External collaborator failed after retries
    #[error("external call failed: {0}")]
    External(#[from] ExternalError),

    /// Diagnosis engine could not reach the model
    #[error("diagnosis failed: {0}")]
    Diagnosis(#[from] DiagnosisError),

    /// Notification channel exhausted its retries
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// Approval gate failure
    #[error("approval gate error: {0}")]
    Approval(#[from] ApprovalError),

    /// Lifecycle bookkeeping bug surfaced as an error, never a panic
    #[error("investigation state error: {0}")]
    State(#[from] IllegalTransition),

    /// The run was cancelled mid-flight
    #[error("run cancelled")]
    Cancelled,

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}
