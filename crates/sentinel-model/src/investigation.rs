//! Investigation aggregate
//!
//! Binds one incident to its context, diagnosis, cost projection, and
//! approval state, and owns the lifecycle state machine. Only the
//! orchestrator advances the state; every other component contributes a
//! typed result that gets folded in through the methods here.

use crate::cost::CostProjection;
use crate::diagnosis::{Diagnosis, DiagnosticContext};
use crate::ids::{InvestigationId, RunId};
use crate::incident::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestigationState {
    /// Incident deduplicated, nothing resolved yet
    Collected,
    /// Diagnostic context assembled
    ContextBuilt,
    /// Diagnosis produced (complete or incomplete)
    Diagnosed,
    /// Cost projection computed (possibly null)
    Costed,
    /// Waiting on an explicit human decision
    PendingApproval,
    /// Decision recorded: approved
    Approved,
    /// Decision recorded: rejected
    Rejected,
    /// Notification handed to the external channel; terminal
    Notified,
    /// Terminated without notification; terminal
    Closed,
}

impl InvestigationState {
    /// States reachable from this one
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [InvestigationState] {
        use InvestigationState::{
            Approved, Closed, Collected, ContextBuilt, Costed, Diagnosed, Notified,
            PendingApproval, Rejected,
        };
        match self {
            Collected => &[ContextBuilt, Closed],
            ContextBuilt => &[Diagnosed, Closed],
            Diagnosed => &[Costed, Closed],
            Costed => &[PendingApproval, Closed],
            PendingApproval => &[Approved, Rejected, Closed],
            Approved => &[Notified],
            Rejected => &[Closed],
            Notified | Closed => &[],
        }
    }

    /// Whether the lifecycle ends here
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Notified | Self::Closed)
    }
}

impl std::fmt::Display for InvestigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collected => "collected",
            Self::ContextBuilt => "context-built",
            Self::Diagnosed => "diagnosed",
            Self::Costed => "costed",
            Self::PendingApproval => "pending-approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Notified => "notified",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Illegal lifecycle transition
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("illegal investigation transition: {from} -> {to}")]
pub struct IllegalTransition {
    /// State the investigation was in
    pub from: InvestigationState,
    /// State that was requested
    pub to: InvestigationState,
}

fn validate_transition(
    from: InvestigationState,
    to: InvestigationState,
) -> Result<(), IllegalTransition> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}

/// Aggregate root for one incident's pass through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    /// Unique id, referenced by approval decisions and notifications
    pub id: InvestigationId,
    /// Pipeline run that created this investigation
    pub run_id: RunId,
    /// The deduplicated incident under investigation
    pub incident: Incident,
    /// Diagnostic bundle, present from `ContextBuilt` on
    pub context: Option<DiagnosticContext>,
    /// Diagnosis, present from `Diagnosed` on
    pub diagnosis: Option<Diagnosis>,
    /// Cost projection; stays `None` when the warehouse tier is unknown
    pub cost: Option<CostProjection>,
    /// Current lifecycle state
    state: InvestigationState,
    /// Why the investigation was closed, when it was
    pub closed_reason: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last transition timestamp
    pub updated_at: DateTime<Utc>,
}

impl Investigation {
    /// Open a new investigation for a freshly collected incident
    #[must_use]
    pub fn open(run_id: RunId, incident: Incident) -> Self {
        let now = Utc::now();
        Self {
            id: InvestigationId::new(),
            run_id,
            incident,
            context: None,
            diagnosis: None,
            cost: None,
            state: InvestigationState::Collected,
            closed_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> InvestigationState {
        self.state
    }

    fn advance(&mut self, to: InvestigationState) -> Result<(), IllegalTransition> {
        validate_transition(self.state, to)?;
        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Fold in the diagnostic context
    pub fn attach_context(&mut self, context: DiagnosticContext) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::ContextBuilt)?;
        self.context = Some(context);
        Ok(())
    }

    /// Fold in the diagnosis
    pub fn attach_diagnosis(&mut self, diagnosis: Diagnosis) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Diagnosed)?;
        self.diagnosis = Some(diagnosis);
        Ok(())
    }

    /// Fold in the cost projection (`None` records a null projection)
    pub fn attach_cost(&mut self, cost: Option<CostProjection>) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Costed)?;
        self.cost = cost;
        Ok(())
    }

    /// Park the investigation behind the approval gate
    pub fn submit_for_approval(&mut self) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::PendingApproval)
    }

    /// Record an accept decision
    pub fn approve(&mut self) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Approved)
    }

    /// Record a reject decision
    pub fn reject(&mut self) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Rejected)
    }

    /// Mark the approved investigation as handed to the channel
    pub fn mark_notified(&mut self) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Notified)
    }

    /// Terminate without notification, recording why
    pub fn close(&mut self, reason: impl Into<String>) -> Result<(), IllegalTransition> {
        self.advance(InvestigationState::Closed)?;
        self.closed_reason = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::{Completeness, DiagnosisCategory};
    use crate::event::{FailureEvent, TaskState};
    use chrono::TimeZone;

    fn incident() -> Incident {
        Incident::first_seen(FailureEvent {
            task_name: "task_a".to_string(),
            state: TaskState::Failed,
            error_code: None,
            error_message: "Division by zero".to_string(),
            scheduled_time: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            completed_time: None,
            execution_time_seconds: 60.0,
            warehouse_size: "X-Small".to_string(),
            query_reference: "qid-1".to_string(),
        })
    }

    fn context() -> DiagnosticContext {
        DiagnosticContext {
            statement_text: "SELECT revenue / orders FROM sales".to_string(),
            error_message: "Division by zero".to_string(),
            object_ddls: vec![],
        }
    }

    fn diagnosis() -> Diagnosis {
        Diagnosis {
            root_cause: "denominator can be zero".to_string(),
            fixed_statement: Some("SELECT 1".to_string()),
            rationale: "guard".to_string(),
            category: DiagnosisCategory::DivisionByZero,
            completeness: Completeness::Complete,
            attempts_used: 1,
            raw_response: None,
        }
    }

    #[test]
    fn happy_path_walks_the_full_lifecycle() {
        let mut inv = Investigation::open(RunId::new(), incident());
        assert_eq!(inv.state(), InvestigationState::Collected);

        inv.attach_context(context()).unwrap();
        inv.attach_diagnosis(diagnosis()).unwrap();
        inv.attach_cost(None).unwrap();
        inv.submit_for_approval().unwrap();
        inv.approve().unwrap();
        inv.mark_notified().unwrap();

        assert_eq!(inv.state(), InvestigationState::Notified);
        assert!(inv.state().is_terminal());
    }

    #[test]
    fn cannot_skip_stages() {
        let mut inv = Investigation::open(RunId::new(), incident());
        let err = inv.attach_diagnosis(diagnosis()).unwrap_err();
        assert_eq!(err.from, InvestigationState::Collected);
        assert_eq!(err.to, InvestigationState::Diagnosed);
    }

    #[test]
    fn approved_cannot_be_closed() {
        let mut inv = Investigation::open(RunId::new(), incident());
        inv.attach_context(context()).unwrap();
        inv.attach_diagnosis(diagnosis()).unwrap();
        inv.attach_cost(None).unwrap();
        inv.submit_for_approval().unwrap();
        inv.approve().unwrap();

        assert!(inv.close("cancelled").is_err());
        assert_eq!(inv.state(), InvestigationState::Approved);
    }

    #[test]
    fn close_records_reason_and_is_terminal() {
        let mut inv = Investigation::open(RunId::new(), incident());
        inv.close("context unavailable").unwrap();
        assert_eq!(inv.closed_reason.as_deref(), Some("context unavailable"));
        assert!(inv.mark_notified().is_err());
    }

    #[test]
    fn rejected_only_closes() {
        let mut inv = Investigation::open(RunId::new(), incident());
        inv.attach_context(context()).unwrap();
        inv.attach_diagnosis(diagnosis()).unwrap();
        inv.attach_cost(None).unwrap();
        inv.submit_for_approval().unwrap();
        inv.reject().unwrap();

        assert!(inv.mark_notified().is_err());
        inv.close("rejected by reviewer").unwrap();
    }
}
