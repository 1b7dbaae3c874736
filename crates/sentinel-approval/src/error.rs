//! Error types for the approval gate

use sentinel_model::InvestigationId;

/// Approval gate failure
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// Decision or state requested for an id the gate never saw
    #[error("unknown investigation: {0}")]
    UnknownInvestigation(InvestigationId),

    /// Snapshot persistence failed
    #[error("gate snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failed
    #[error("gate snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
