//! Per-run summaries
//!
//! The run summary is the sole contract the pipeline exposes outward;
//! how a dashboard renders it is somebody else's problem.

use crate::approval::ApprovalState;
use crate::cost::CostProjection;
use crate::ids::{Fingerprint, RunId};
use crate::investigation::InvestigationState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of the run summary, keyed by incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Task the incident belongs to
    pub task_name: String,
    /// One-line diagnosis summary, if a diagnosis was produced
    pub diagnosis: Option<String>,
    /// Cost projection, if one was computed
    pub cost_projection: Option<CostProjection>,
    /// Approval gate state
    pub approval_state: ApprovalState,
    /// Final lifecycle state the investigation reached this run
    pub investigation_state: InvestigationState,
}

/// Stage counters for one pipeline pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Incidents produced by the collector
    pub collected: u32,
    /// Raw events skipped for malformed task names
    pub collection_anomalies: u32,
    /// Investigations closed because context could not be resolved
    pub context_unavailable: u32,
    /// Investigations that received a diagnosis
    pub diagnosed: u32,
    /// Diagnoses marked incomplete after retries
    pub incomplete_diagnoses: u32,
    /// Investigations that received a (possibly null) cost projection
    pub costed: u32,
    /// Investigations approved
    pub approved: u32,
    /// Investigations rejected
    pub rejected: u32,
    /// Notifications accepted by the channel
    pub notified: u32,
    /// Investigations that failed with an escalated error
    pub failed: u32,
}

/// Aggregated outcome of one pipeline pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The run this summary describes
    pub run_id: RunId,
    /// Per-incident rows, in deterministic collection order
    pub incidents: IndexMap<Fingerprint, IncidentReport>,
    /// Stage counters
    pub counters: RunCounters,
}

impl RunSummary {
    /// Empty summary for a new run
    #[must_use]
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            incidents: IndexMap::new(),
            counters: RunCounters::default(),
        }
    }

    /// Total projected annual savings across all costed incidents
    #[must_use]
    pub fn total_projected_savings_usd(&self) -> f64 {
        self.incidents
            .values()
            .filter_map(|r| r.cost_projection.as_ref())
            .map(|c| c.projected_annual_savings_usd)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(savings: Option<f64>) -> IncidentReport {
        IncidentReport {
            task_name: "task".to_string(),
            diagnosis: None,
            cost_projection: savings.map(|s| CostProjection {
                credits_per_run: 1.0,
                executions_per_year: 10,
                annual_credits: 10.0,
                improvement_fraction: 0.1,
                projected_annual_savings_usd: s,
            }),
            approval_state: ApprovalState::Pending,
            investigation_state: InvestigationState::PendingApproval,
        }
    }

    #[test]
    fn savings_total_skips_null_projections() {
        let mut summary = RunSummary::new(RunId::new());
        summary
            .incidents
            .insert(Fingerprint::of_task("a"), report(Some(12.5)));
        summary
            .incidents
            .insert(Fingerprint::of_task("b"), report(None));
        summary
            .incidents
            .insert(Fingerprint::of_task("c"), report(Some(7.5)));

        assert!((summary.total_projected_savings_usd() - 20.0).abs() < f64::EPSILON);
    }
}
