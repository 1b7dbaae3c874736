//! Notification rendering and delivery
//!
//! Runs only for investigations the gate approved. Delivery failures are
//! retried independently of pipeline state; exhaustion is surfaced as an
//! operational alert and recorded, never rolled back into the
//! investigation's approved state.

use crate::error::PipelineError;
use crate::external::NotificationChannel;
use crate::retry::RetryPolicy;
use sentinel_model::{Investigation, NotificationPayload, NotificationRecord};
use std::sync::Arc;

/// Render the outbound payload for an approved investigation
#[must_use]
pub fn render_payload(investigation: &Investigation) -> NotificationPayload {
    let incident = &investigation.incident;
    let mut body = String::new();

    body.push_str(&format!(
        "Task failure investigated: {}\nOccurrences this window: {}\nError: {}\n",
        incident.task_name, incident.occurrences, incident.latest_event.error_message
    ));

    if let Some(diagnosis) = &investigation.diagnosis {
        body.push_str(&format!("\nRoot cause: {}\n", diagnosis.summary()));
        match diagnosis.fixed_statement.as_deref() {
            Some(fix) => body.push_str(&format!("\nProposed fix:\n{fix}\n")),
            None => body.push_str("\nNo automated fix available.\n"),
        }
        body.push_str(&format!("\nRationale: {}\n", diagnosis.rationale));
    }

    if let Some(cost) = &investigation.cost {
        body.push_str(&format!(
            "\nCost impact: {:.4} credits/run, {} runs/year, projected annual savings ${:.2}\n",
            cost.credits_per_run, cost.executions_per_year, cost.projected_annual_savings_usd
        ));
    } else {
        body.push_str("\nCost impact: not available (unknown warehouse tier).\n");
    }

    body.push_str(&format!("\nApproval reference: {}\n", investigation.id));

    NotificationPayload {
        subject: format!("[Sentinel] Fix proposed: {}", incident.task_name),
        body,
        incident_reference: incident.fingerprint.short().to_string(),
    }
}

/// Delivers rendered payloads through the external channel
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    retry: RetryPolicy,
}

impl Notifier {
    /// Create a notifier over a channel
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>, retry: RetryPolicy) -> Self {
        Self { channel, retry }
    }

    /// Render and deliver the notification for an approved investigation
    ///
    /// Returns the record either way; the caller decides what the
    /// investigation does with a failed delivery (nothing, per design).
    pub async fn notify(&self, investigation: &Investigation) -> NotificationRecord {
        let payload = render_payload(investigation);
        let mut record = NotificationRecord::pending(investigation.id, payload);

        let delivery = self
            .retry
            .run("channel.deliver", || {
                record.attempts += 1;
                let payload = record.payload.clone();
                let channel = Arc::clone(&self.channel);
                async move { channel.deliver(&payload).await }
            })
            .await;

        match delivery {
            Ok(()) => {
                record.mark_sent();
                tracing::info!(
                    investigation = %investigation.id,
                    attempts = record.attempts,
                    "notification delivered"
                );
            }
            Err(e) => {
                record.mark_failed();
                // Operational alert: approved work is sitting undelivered.
                tracing::error!(
                    investigation = %investigation.id,
                    attempts = record.attempts,
                    error = %e,
                    "notification delivery exhausted retries"
                );
            }
        }
        record
    }

    /// Delivery outcome as a pipeline error, for counter bookkeeping
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotificationDelivery`] for failed records.
    pub fn as_result(record: &NotificationRecord) -> Result<(), PipelineError> {
        match record.status {
            sentinel_model::DeliveryStatus::Failed => Err(PipelineError::NotificationDelivery(
                format!("delivery failed after {} attempts", record.attempts),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ExternalError;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use sentinel_model::{
        Completeness, DeliveryStatus, Diagnosis, DiagnosisCategory, DiagnosticContext,
        FailureEvent, Incident, RunId, TaskState,
    };
    use std::time::Duration;

    struct CountingChannel {
        fail_first: u32,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl NotificationChannel for CountingChannel {
        async fn deliver(&self, _payload: &NotificationPayload) -> Result<(), ExternalError> {
            let n = {
                let mut calls = self.calls.lock();
                *calls += 1;
                *calls
            };
            if n <= self.fail_first {
                Err(ExternalError::Transient("smtp unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn approved_investigation() -> Investigation {
        let incident = Incident::first_seen(FailureEvent {
            task_name: "task_broken_division".to_string(),
            state: TaskState::Failed,
            error_code: Some("100038".to_string()),
            error_message: "Division by zero".to_string(),
            scheduled_time: Utc::now(),
            completed_time: None,
            execution_time_seconds: 120.0,
            warehouse_size: "X-Small".to_string(),
            query_reference: "qid-1".to_string(),
        });
        let mut inv = Investigation::open(RunId::new(), incident);
        inv.attach_context(DiagnosticContext {
            statement_text: "SELECT revenue / orders FROM sales".to_string(),
            error_message: "Division by zero".to_string(),
            object_ddls: vec![],
        })
        .unwrap();
        inv.attach_diagnosis(Diagnosis {
            root_cause: "orders can be zero".to_string(),
            fixed_statement: Some(
                "SELECT CASE WHEN orders = 0 THEN 0 ELSE revenue / orders END FROM sales"
                    .to_string(),
            ),
            rationale: "guard the denominator".to_string(),
            category: DiagnosisCategory::DivisionByZero,
            completeness: Completeness::Complete,
            attempts_used: 1,
            raw_response: None,
        })
        .unwrap();
        inv.attach_cost(None).unwrap();
        inv.submit_for_approval().unwrap();
        inv.approve().unwrap();
        inv
    }

    #[test]
    fn payload_contains_identity_fix_and_reference() {
        let inv = approved_investigation();
        let payload = render_payload(&inv);

        assert_eq!(payload.subject, "[Sentinel] Fix proposed: task_broken_division");
        assert!(payload.body.contains("orders can be zero"));
        assert!(payload.body.contains("CASE WHEN orders = 0"));
        assert!(payload.body.contains(&inv.id.to_string()));
        assert!(payload.body.contains("unknown warehouse tier"));
        assert_eq!(payload.incident_reference, inv.incident.fingerprint.short());
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_retries_then_succeeds() {
        let channel = Arc::new(CountingChannel {
            fail_first: 1,
            calls: Mutex::new(0),
        });
        let notifier = Notifier::new(
            channel,
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(10),
                ..RetryPolicy::default()
            },
        );

        let record = notifier.notify(&approved_investigation()).await;
        assert_eq!(record.status, DeliveryStatus::Sent);
        assert_eq!(record.attempts, 2);
        assert!(record.sent_at.is_some());
        assert!(Notifier::as_result(&record).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_delivery_is_recorded_as_failed() {
        let channel = Arc::new(CountingChannel {
            fail_first: u32::MAX,
            calls: Mutex::new(0),
        });
        let notifier = Notifier::new(
            channel,
            RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(10),
                ..RetryPolicy::default()
            },
        );

        let record = notifier.notify(&approved_investigation()).await;
        assert_eq!(record.status, DeliveryStatus::Failed);
        assert_eq!(record.attempts, 3);
        assert!(Notifier::as_result(&record).is_err());
    }
}
