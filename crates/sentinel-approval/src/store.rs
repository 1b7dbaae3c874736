//! Decision persistence
//!
//! The gate's state outlives a pipeline run: pending investigations must
//! survive a process restart so a reviewer's decision can land later.
//! `DecisionStore` is the persistence seam; the in-memory implementation
//! covers tests and single-process deployments and can snapshot itself
//! to disk as JSON.

use crate::error::ApprovalError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sentinel_model::{ApprovalState, DecisionRecord, InvestigationId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One gate entry: a submitted investigation and its decision, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateEntry {
    /// When the investigation was parked at the gate
    pub submitted_at: DateTime<Utc>,
    /// The recorded decision; `None` while pending
    pub decision: Option<DecisionRecord>,
}

impl GateEntry {
    /// Gate state implied by this entry
    #[must_use]
    pub fn state(&self) -> ApprovalState {
        self.decision
            .as_ref()
            .map_or(ApprovalState::Pending, |r| r.decision.into())
    }
}

/// Persistence seam for the approval gate
pub trait DecisionStore: Send + Sync {
    /// Register an investigation as pending; idempotent
    fn submit(&self, id: InvestigationId);

    /// Record a decision if none exists yet; returns the winning record
    ///
    /// # Errors
    ///
    /// Fails with [`ApprovalError::UnknownInvestigation`] when the id was
    /// never submitted.
    fn record(
        &self,
        id: InvestigationId,
        record: DecisionRecord,
    ) -> Result<DecisionRecord, ApprovalError>;

    /// Current gate state for an investigation
    ///
    /// # Errors
    ///
    /// Fails with [`ApprovalError::UnknownInvestigation`] when the id was
    /// never submitted.
    fn state(&self, id: InvestigationId) -> Result<ApprovalState, ApprovalError>;

    /// Ids still waiting on a decision
    fn pending(&self) -> Vec<InvestigationId>;
}

/// In-memory decision store with JSON snapshots
#[derive(Debug, Default)]
pub struct MemoryDecisionStore {
    entries: DashMap<InvestigationId, GateEntry>,
}

impl MemoryDecisionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write all entries to a JSON snapshot file
    ///
    /// # Errors
    ///
    /// Fails on filesystem or serialization problems.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), ApprovalError> {
        let entries: Vec<(InvestigationId, GateEntry)> = self
            .entries
            .iter()
            .map(|kv| (*kv.key(), kv.value().clone()))
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json)?;
        tracing::debug!(entries = entries.len(), path = %path.display(), "gate snapshot saved");
        Ok(())
    }

    /// Rebuild a store from a JSON snapshot file
    ///
    /// # Errors
    ///
    /// Fails on filesystem or deserialization problems.
    pub fn load_snapshot(path: &Path) -> Result<Self, ApprovalError> {
        let json = std::fs::read_to_string(path)?;
        let entries: Vec<(InvestigationId, GateEntry)> = serde_json::from_str(&json)?;
        let store = Self::new();
        for (id, entry) in entries {
            store.entries.insert(id, entry);
        }
        Ok(store)
    }
}

impl DecisionStore for MemoryDecisionStore {
    fn submit(&self, id: InvestigationId) {
        self.entries.entry(id).or_insert_with(|| GateEntry {
            submitted_at: Utc::now(),
            decision: None,
        });
    }

    fn record(
        &self,
        id: InvestigationId,
        record: DecisionRecord,
    ) -> Result<DecisionRecord, ApprovalError> {
        let mut entry = self
            .entries
            .get_mut(&id)
            .ok_or(ApprovalError::UnknownInvestigation(id))?;
        match &entry.decision {
            // First decision wins; later submissions are no-ops.
            Some(existing) => Ok(existing.clone()),
            None => {
                entry.decision = Some(record.clone());
                Ok(record)
            }
        }
    }

    fn state(&self, id: InvestigationId) -> Result<ApprovalState, ApprovalError> {
        self.entries
            .get(&id)
            .map(|e| e.state())
            .ok_or(ApprovalError::UnknownInvestigation(id))
    }

    fn pending(&self) -> Vec<InvestigationId> {
        self.entries
            .iter()
            .filter(|kv| kv.value().decision.is_none())
            .map(|kv| *kv.key())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_model::Decision;

    fn record(decision: Decision) -> DecisionRecord {
        DecisionRecord {
            decision,
            decided_by: "reviewer@example.com".to_string(),
            decided_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_pending_and_decided() {
        let store = MemoryDecisionStore::new();
        let pending_id = InvestigationId::new();
        let decided_id = InvestigationId::new();
        store.submit(pending_id);
        store.submit(decided_id);
        store.record(decided_id, record(Decision::Approved)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.json");
        store.save_snapshot(&path).unwrap();

        let restored = MemoryDecisionStore::load_snapshot(&path).unwrap();
        assert_eq!(restored.state(pending_id).unwrap(), ApprovalState::Pending);
        assert_eq!(restored.state(decided_id).unwrap(), ApprovalState::Approved);
        assert_eq!(restored.pending(), vec![pending_id]);
    }

    #[test]
    fn resubmit_does_not_reset_a_decision() {
        let store = MemoryDecisionStore::new();
        let id = InvestigationId::new();
        store.submit(id);
        store.record(id, record(Decision::Rejected)).unwrap();
        store.submit(id);
        assert_eq!(store.state(id).unwrap(), ApprovalState::Rejected);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let store = MemoryDecisionStore::new();
        let id = InvestigationId::new();
        assert!(matches!(
            store.state(id),
            Err(ApprovalError::UnknownInvestigation(_))
        ));
        assert!(matches!(
            store.record(id, record(Decision::Approved)),
            Err(ApprovalError::UnknownInvestigation(_))
        ));
    }
}
