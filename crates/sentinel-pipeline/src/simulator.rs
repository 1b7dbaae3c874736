//! Demo scenario runner
//!
//! Exercises the full pipeline against canned collaborators, no external
//! services required:
//! 1. A fixed batch of failed task runs, including one duplicate
//! 2. A warehouse fake resolving each query reference to statement text
//! 3. A model fake answering with well-formed diagnosis sections
//! 4. A channel that logs payloads instead of sending mail
//!
//! The `sentinel demo` subcommand drives this; tests use it as a smoke
//! scenario for the wired-together pipeline.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::external::{
    ExternalError, FailureSource, NotificationChannel, StatementContext, WarehouseClient,
};
use crate::orchestrator::{Orchestrator, RunOutcome};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sentinel_approval::MemoryDecisionStore;
use sentinel_diagnosis::{ModelClient, ModelError};
use sentinel_model::{Decision, FailureEvent, InvestigationState, TaskState};
use std::sync::Arc;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Pipeline tuning for the demo run
    pub pipeline: PipelineConfig,
    /// Approve every pending investigation after the pass
    pub approve_all: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            // Demo tasks nominally run every 5 minutes; an unthrottled
            // model keeps the demo instant.
            pipeline: PipelineConfig::default()
                .with_default_schedule("5 MINUTE")
                .with_model_calls_per_minute(6000),
            approve_all: false,
        }
    }
}

fn demo_event(task_name: &str, error_message: &str, query_reference: &str) -> FailureEvent {
    FailureEvent {
        task_name: task_name.to_string(),
        state: TaskState::Failed,
        error_code: Some("100038".to_string()),
        error_message: error_message.to_string(),
        scheduled_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        completed_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 2, 0).unwrap()),
        execution_time_seconds: 120.0,
        warehouse_size: "X-Small".to_string(),
        query_reference: query_reference.to_string(),
    }
}

struct DemoFailureSource;

#[async_trait]
impl FailureSource for DemoFailureSource {
    async fn fetch_events(&self, _lookback_hours: u32) -> Result<Vec<FailureEvent>, ExternalError> {
        Ok(vec![
            demo_event("task_broken_division", "Division by zero", "qid-div-1"),
            demo_event("task_broken_division", "Division by zero", "qid-div-2"),
            demo_event(
                "task_missing_column",
                "SQL compilation error: invalid identifier 'REVENUE'",
                "qid-col-1",
            ),
            demo_event(
                "task_missing_table",
                "Object 'ANALYTICS.SALES' does not exist or not authorized",
                "qid-tab-1",
            ),
        ])
    }
}

struct DemoWarehouse;

#[async_trait]
impl WarehouseClient for DemoWarehouse {
    async fn statement_context(
        &self,
        query_reference: &str,
    ) -> Result<StatementContext, ExternalError> {
        let statement_text = match query_reference {
            "qid-div-1" | "qid-div-2" => "SELECT amount / quantity FROM orders",
            "qid-col-1" => "SELECT revenue FROM analytics.daily_sales",
            "qid-tab-1" => "INSERT INTO analytics.sales SELECT * FROM staging.sales",
            _ => return Err(ExternalError::NotFound),
        };
        Ok(StatementContext {
            statement_text: statement_text.to_string(),
            object_ddls: vec!["CREATE TABLE orders (amount NUMBER, quantity NUMBER);".to_string()],
        })
    }
}

/// Answers with a canned diagnosis matched on the failing statement
struct DemoModelClient;

#[async_trait]
impl ModelClient for DemoModelClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let (root_cause, fix, explanation) = if prompt.contains("Division by zero") {
            (
                "The quantity column contains zero rows, so the division faults at runtime.",
                "SELECT amount / NULLIF(quantity, 0) FROM orders",
                "NULLIF turns a zero divisor into NULL instead of an error.",
            )
        } else if prompt.contains("invalid identifier") {
            (
                "The statement references a column that was renamed away.",
                "SELECT total_revenue FROM analytics.daily_sales",
                "total_revenue is the surviving column for this measure.",
            )
        } else if prompt.contains("does not exist") {
            (
                "The target table was dropped or the role lost access to it.",
                "INSERT INTO analytics.sales_v2 SELECT * FROM staging.sales",
                "sales_v2 replaced the dropped table in the latest migration.",
            )
        } else {
            (
                "The statement failed for a reason the canned demo cannot match.",
                "NONE",
                "Manual review required.",
            )
        };
        Ok(format!(
            "ROOT CAUSE: {root_cause}\nFIXED SQL: {fix}\nEXPLANATION: {explanation}"
        ))
    }
}

struct LoggingChannel;

#[async_trait]
impl NotificationChannel for LoggingChannel {
    async fn deliver(
        &self,
        payload: &sentinel_model::NotificationPayload,
    ) -> Result<(), ExternalError> {
        tracing::info!(subject = %payload.subject, "demo notification");
        println!("--- {subject} ---\n{body}\n", subject = payload.subject, body = payload.body);
        Ok(())
    }
}

/// Run the demo scenario end to end
///
/// # Errors
///
/// Propagates pipeline failures; the canned collaborators themselves
/// never fail.
pub async fn run_simulator(config: SimulatorConfig) -> Result<RunOutcome, PipelineError> {
    let orchestrator = Orchestrator::new(
        config.pipeline,
        Arc::new(DemoFailureSource),
        Arc::new(DemoWarehouse),
        Arc::new(DemoModelClient),
        Arc::new(LoggingChannel),
        Arc::new(MemoryDecisionStore::new()),
    );

    let mut outcome = orchestrator.run().await?;

    if config.approve_all {
        for investigation in &mut outcome.investigations {
            if investigation.state() != InvestigationState::PendingApproval {
                continue;
            }
            orchestrator
                .gate()
                .record_decision(investigation.id, Decision::Approved, "simulator")?;
            if let Some(record) = orchestrator.finalize(investigation).await? {
                outcome.notifications.push(record);
            }
            outcome.summary.counters.approved += 1;
            if investigation.state() == InvestigationState::Notified {
                outcome.summary.counters.notified += 1;
            }
            if let Some(report) = outcome
                .summary
                .incidents
                .get_mut(&investigation.incident.fingerprint)
            {
                report.approval_state = sentinel_model::ApprovalState::Approved;
                report.investigation_state = investigation.state();
            }
        }
    }

    Ok(outcome)
}
