//! Approval decisions
//!
//! Shared vocabulary for the approval gate: the decision a reviewer
//! records and the gate state an investigation sits in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Explicit decision recorded for one investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    /// Reviewer accepted the proposed fix
    Approved,
    /// Reviewer rejected the proposed fix
    Rejected,
}

/// Gate state for one investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalState {
    /// No decision recorded yet
    Pending,
    /// Accept decision recorded
    Approved,
    /// Reject decision recorded
    Rejected,
}

impl ApprovalState {
    /// Whether a decision has been recorded
    #[inline]
    #[must_use]
    pub fn is_decided(self) -> bool {
        self != Self::Pending
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{label}")
    }
}

impl From<Decision> for ApprovalState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}

/// A recorded decision with its audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// The decision taken
    pub decision: Decision,
    /// Who or what recorded it (reviewer login, policy name)
    pub decided_by: String,
    /// When it was recorded
    pub decided_at: DateTime<Utc>,
}
