//! Approval gate
//!
//! The single invariant that makes the system safe to run against
//! production: nothing moves past `pending` without an explicit decision
//! recorded through this gate, and notification happens only from
//! `approved`. Re-submitting a decision is a no-op; the first decision
//! wins, including when a later submission conflicts.

use crate::error::ApprovalError;
use crate::store::DecisionStore;
use chrono::Utc;
use sentinel_model::{ApprovalState, Decision, DecisionRecord, InvestigationId};
use std::sync::Arc;

/// State barrier between the pipeline and any outbound side effect
#[derive(Clone)]
pub struct ApprovalGate {
    store: Arc<dyn DecisionStore>,
}

impl ApprovalGate {
    /// Create a gate over a decision store
    #[must_use]
    pub fn new(store: Arc<dyn DecisionStore>) -> Self {
        Self { store }
    }

    /// Park an investigation at the gate as pending; idempotent
    pub fn submit(&self, id: InvestigationId) {
        self.store.submit(id);
        tracing::info!(investigation = %id, "investigation pending approval");
    }

    /// Record an explicit decision
    ///
    /// Idempotent: the first decision for an id wins, and every later
    /// submission (agreeing or conflicting) returns the already-recorded
    /// state unchanged.
    ///
    /// # Errors
    ///
    /// Fails with [`ApprovalError::UnknownInvestigation`] for ids the
    /// gate never saw.
    pub fn record_decision(
        &self,
        id: InvestigationId,
        decision: Decision,
        decided_by: impl Into<String>,
    ) -> Result<ApprovalState, ApprovalError> {
        let record = DecisionRecord {
            decision,
            decided_by: decided_by.into(),
            decided_at: Utc::now(),
        };
        let winning = self.store.record(id, record)?;
        let state = ApprovalState::from(winning.decision);
        if winning.decision == decision {
            tracing::info!(investigation = %id, ?state, by = %winning.decided_by, "decision recorded");
        } else {
            tracing::warn!(
                investigation = %id,
                ?state,
                attempted = ?decision,
                "conflicting decision ignored, keeping first"
            );
        }
        Ok(state)
    }

    /// Current gate state for an investigation
    ///
    /// # Errors
    ///
    /// Fails with [`ApprovalError::UnknownInvestigation`] for ids the
    /// gate never saw.
    pub fn get_state(&self, id: InvestigationId) -> Result<ApprovalState, ApprovalError> {
        self.store.state(id)
    }

    /// Ids still awaiting a decision
    #[must_use]
    pub fn pending(&self) -> Vec<InvestigationId> {
        self.store.pending()
    }
}
