//! Pipeline orchestration
//!
//! One pass runs Collector → ContextBuilder → DiagnosisEngine →
//! CostEstimator → ApprovalGate → Notifier, in that fixed order, one
//! incident at a time. Sequencing is deliberate: one diagnosis call per
//! unique incident bounds external spend and keeps the audit trail
//! linear. The orchestrator is the only component that mutates
//! investigation state; everything else hands it typed results.
//!
//! A failure in one incident's pipeline never aborts another's. Each
//! incident ends in exactly one summary row.

use crate::config::PipelineConfig;
use crate::context::ContextBuilder;
use crate::error::PipelineError;
use crate::external::{FailureSource, NotificationChannel, WarehouseClient};
use crate::model::GovernedModelClient;
use crate::notify::Notifier;
use crate::retry::{CancellationFlag, RateLimiter};
use sentinel_approval::{ApprovalGate, DecisionStore};
use sentinel_cost::{CostEstimator, UnknownWarehouseTier};
use sentinel_diagnosis::{DiagnosisEngine, EngineConfig, ModelClient};
use sentinel_model::{
    ApprovalState, DeliveryStatus, IncidentReport, Investigation, InvestigationState,
    NotificationRecord, RunId, RunSummary,
};
use std::sync::Arc;

/// Everything one pipeline pass produced
#[derive(Debug)]
pub struct RunOutcome {
    /// Per-run summary, the outward-facing contract
    pub summary: RunSummary,
    /// Every investigation the pass touched, in summary order
    pub investigations: Vec<Investigation>,
    /// Notification records for approved investigations
    pub notifications: Vec<NotificationRecord>,
}

/// Drives the investigation pipeline
pub struct Orchestrator {
    config: PipelineConfig,
    source: Arc<dyn FailureSource>,
    context_builder: ContextBuilder,
    engine: DiagnosisEngine,
    estimator: CostEstimator,
    gate: ApprovalGate,
    notifier: Notifier,
    cancel: CancellationFlag,
}

impl Orchestrator {
    /// Wire up a pipeline from its external collaborators
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn FailureSource>,
        warehouse: Arc<dyn WarehouseClient>,
        model: Arc<dyn ModelClient>,
        channel: Arc<dyn NotificationChannel>,
        store: Arc<dyn DecisionStore>,
    ) -> Self {
        let retry = config.retry_policy();
        let limiter = Arc::new(RateLimiter::per_minute(config.model_calls_per_minute));
        let governed: Arc<dyn ModelClient> =
            Arc::new(GovernedModelClient::new(model, limiter, retry));
        let engine = DiagnosisEngine::new(
            governed,
            EngineConfig {
                max_retries: config.diagnosis_retries,
            },
        );
        Self {
            context_builder: ContextBuilder::new(warehouse, retry),
            engine,
            estimator: CostEstimator::new(config.cost.clone()),
            gate: ApprovalGate::new(store),
            notifier: Notifier::new(channel, retry),
            cancel: CancellationFlag::new(),
            config,
            source,
        }
    }

    /// Handle for cancelling an in-flight run
    #[must_use]
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// The approval gate, for recording external decisions
    #[must_use]
    pub fn gate(&self) -> &ApprovalGate {
        &self.gate
    }

    /// Execute one full pipeline pass
    ///
    /// # Errors
    ///
    /// Fails only when the failure source itself cannot be read; every
    /// per-incident failure is isolated into that incident's summary row.
    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let run_id = RunId::new();
        tracing::info!(%run_id, lookback_hours = self.config.lookback_hours, "pipeline run starting");

        let retry = self.config.retry_policy();
        let events = retry
            .run("source.fetch_events", || {
                self.source.fetch_events(self.config.lookback_hours)
            })
            .await?;

        let collection = sentinel_collector::collect(events);
        let mut summary = RunSummary::new(run_id);
        summary.counters.collection_anomalies = collection.anomalies;
        summary.counters.collected = u32::try_from(collection.incidents.len()).unwrap_or(u32::MAX);
        tracing::info!(
            incidents = collection.incidents.len(),
            anomalies = collection.anomalies,
            "collection complete"
        );

        let mut investigations = Vec::with_capacity(collection.incidents.len());
        let mut notifications = Vec::new();

        for (fingerprint, incident) in collection.incidents {
            tracing::info!(task = %incident.task_name, occurrences = incident.occurrences, "investigating");
            let (investigation, record) = self
                .process_incident(run_id, incident, &mut summary.counters)
                .await;

            if let Some(record) = record {
                notifications.push(record);
            }
            summary
                .incidents
                .insert(fingerprint, self.report_row(&investigation));
            investigations.push(investigation);
        }

        tracing::info!(
            %run_id,
            notified = summary.counters.notified,
            failed = summary.counters.failed,
            total_savings_usd = summary.total_projected_savings_usd(),
            "pipeline run complete"
        );

        Ok(RunOutcome {
            summary,
            investigations,
            notifications,
        })
    }

    /// Run one incident through the fixed stage order
    async fn process_incident(
        &self,
        run_id: RunId,
        incident: sentinel_model::Incident,
        counters: &mut sentinel_model::RunCounters,
    ) -> (Investigation, Option<NotificationRecord>) {
        let mut investigation = Investigation::open(run_id, incident);

        match self.advance_stages(&mut investigation, counters).await {
            Ok(record) => (investigation, record),
            Err(PipelineError::ContextUnavailable(reason)) => {
                counters.context_unavailable += 1;
                tracing::warn!(task = %investigation.incident.task_name, %reason, "closing investigation");
                self.close_quietly(&mut investigation, format!("context unavailable: {reason}"));
                (investigation, None)
            }
            Err(PipelineError::Cancelled) => {
                tracing::warn!(task = %investigation.incident.task_name, "run cancelled mid-investigation");
                self.close_quietly(&mut investigation, "run cancelled".to_string());
                (investigation, None)
            }
            Err(e) => {
                counters.failed += 1;
                tracing::error!(task = %investigation.incident.task_name, error = %e, "investigation failed");
                self.close_quietly(&mut investigation, format!("failed: {e}"));
                (investigation, None)
            }
        }
    }

    async fn advance_stages(
        &self,
        investigation: &mut Investigation,
        counters: &mut sentinel_model::RunCounters,
    ) -> Result<Option<NotificationRecord>, PipelineError> {
        self.check_cancelled()?;
        let context = self.context_builder.build(&investigation.incident).await?;
        investigation.attach_context(context.clone())?;

        self.check_cancelled()?;
        let diagnosis = self.engine.diagnose(&context).await?;
        counters.diagnosed += 1;
        if !diagnosis.is_complete() {
            counters.incomplete_diagnoses += 1;
        }
        let category = diagnosis.category;
        investigation.attach_diagnosis(diagnosis)?;

        self.check_cancelled()?;
        let event = &investigation.incident.latest_event;
        let cost = match self.estimator.estimate(
            event.execution_time_seconds,
            &event.warehouse_size,
            category,
            &self.config.default_schedule,
        ) {
            Ok(projection) => Some(projection),
            Err(UnknownWarehouseTier(tier)) => {
                tracing::warn!(task = %investigation.incident.task_name, tier, "unknown warehouse tier, null cost projection");
                None
            }
        };
        counters.costed += 1;
        investigation.attach_cost(cost)?;

        self.check_cancelled()?;
        investigation.submit_for_approval()?;
        self.gate.submit(investigation.id);

        let record = self.finalize(investigation).await?;
        match investigation.state() {
            InvestigationState::Approved | InvestigationState::Notified => {
                counters.approved += 1;
                if investigation.state() == InvestigationState::Notified {
                    counters.notified += 1;
                }
            }
            InvestigationState::Closed => counters.rejected += 1,
            _ => {}
        }
        Ok(record)
    }

    /// Apply a recorded gate decision to a pending investigation
    ///
    /// No-op while the gate is still pending. Used both within a run
    /// (policy stores may pre-record decisions) and to resume parked
    /// investigations after a reviewer decides.
    ///
    /// # Errors
    ///
    /// Propagates gate and lifecycle errors; notification delivery
    /// failure is not an error here (the investigation stays approved).
    pub async fn finalize(
        &self,
        investigation: &mut Investigation,
    ) -> Result<Option<NotificationRecord>, PipelineError> {
        if investigation.state() != InvestigationState::PendingApproval {
            return Ok(None);
        }
        match self.gate.get_state(investigation.id)? {
            ApprovalState::Pending => Ok(None),
            ApprovalState::Approved => {
                investigation.approve()?;
                let record = self.notifier.notify(investigation).await;
                if record.status == DeliveryStatus::Sent {
                    investigation.mark_notified()?;
                }
                Ok(Some(record))
            }
            ApprovalState::Rejected => {
                investigation.reject()?;
                investigation.close("rejected by reviewer")?;
                Ok(None)
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Close without propagating: terminal states simply keep their state
    fn close_quietly(&self, investigation: &mut Investigation, reason: String) {
        if investigation.close(&reason).is_err() {
            tracing::debug!(
                investigation = %investigation.id,
                state = %investigation.state(),
                "investigation already terminal, close skipped"
            );
        }
    }

    fn report_row(&self, investigation: &Investigation) -> IncidentReport {
        let approval_state = self
            .gate
            .get_state(investigation.id)
            .unwrap_or(ApprovalState::Pending);
        IncidentReport {
            task_name: investigation.incident.task_name.clone(),
            diagnosis: investigation.diagnosis.as_ref().map(|d| d.summary()),
            cost_projection: investigation.cost.clone(),
            approval_state,
            investigation_state: investigation.state(),
        }
    }
}
