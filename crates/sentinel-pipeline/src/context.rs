//! Context assembly
//!
//! Resolves the minimal diagnostic bundle for one incident. A missing
//! statement or schema closes that incident's investigation with a
//! "context unavailable" outcome; it never proceeds with partial
//! context, and it never aborts the run.

use crate::error::PipelineError;
use crate::external::{ExternalError, WarehouseClient};
use crate::retry::RetryPolicy;
use sentinel_model::{DiagnosticContext, Incident};
use std::sync::Arc;

/// Assembles diagnostic context from the warehouse
pub struct ContextBuilder {
    warehouse: Arc<dyn WarehouseClient>,
    retry: RetryPolicy,
}

impl ContextBuilder {
    /// Create a builder over a warehouse client
    #[must_use]
    pub fn new(warehouse: Arc<dyn WarehouseClient>, retry: RetryPolicy) -> Self {
        Self { warehouse, retry }
    }

    /// Build the diagnostic bundle for one incident
    ///
    /// # Errors
    ///
    /// [`PipelineError::ContextUnavailable`] when the referencing query
    /// or its statement text cannot be located;
    /// [`PipelineError::External`] when the warehouse stays unreachable
    /// after retries.
    pub async fn build(&self, incident: &Incident) -> Result<DiagnosticContext, PipelineError> {
        let query_reference = &incident.latest_event.query_reference;
        if query_reference.trim().is_empty() {
            return Err(PipelineError::ContextUnavailable(
                "incident has no query reference".to_string(),
            ));
        }

        let statement = self
            .retry
            .run("warehouse.statement_context", || {
                self.warehouse.statement_context(query_reference)
            })
            .await;

        match statement {
            Ok(ctx) if ctx.statement_text.trim().is_empty() => {
                Err(PipelineError::ContextUnavailable(format!(
                    "empty statement text for {query_reference}"
                )))
            }
            Ok(ctx) => {
                tracing::debug!(
                    task = %incident.task_name,
                    ddls = ctx.object_ddls.len(),
                    "diagnostic context assembled"
                );
                Ok(DiagnosticContext {
                    statement_text: ctx.statement_text,
                    error_message: incident.latest_event.error_message.clone(),
                    object_ddls: ctx.object_ddls,
                })
            }
            Err(ExternalError::NotFound) => Err(PipelineError::ContextUnavailable(format!(
                "no statement found for {query_reference}"
            ))),
            Err(e) => Err(PipelineError::External(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::StatementContext;
    use async_trait::async_trait;
    use chrono::Utc;
    use sentinel_model::{FailureEvent, TaskState};

    struct FixedWarehouse {
        result: fn() -> Result<StatementContext, ExternalError>,
    }

    #[async_trait]
    impl WarehouseClient for FixedWarehouse {
        async fn statement_context(
            &self,
            _query_reference: &str,
        ) -> Result<StatementContext, ExternalError> {
            (self.result)()
        }
    }

    fn incident() -> Incident {
        Incident::first_seen(FailureEvent {
            task_name: "task_a".to_string(),
            state: TaskState::Failed,
            error_code: None,
            error_message: "Division by zero".to_string(),
            scheduled_time: Utc::now(),
            completed_time: None,
            execution_time_seconds: 10.0,
            warehouse_size: "X-Small".to_string(),
            query_reference: "qid-1".to_string(),
        })
    }

    fn builder(result: fn() -> Result<StatementContext, ExternalError>) -> ContextBuilder {
        ContextBuilder::new(Arc::new(FixedWarehouse { result }), RetryPolicy::default())
    }

    #[tokio::test]
    async fn context_carries_the_incident_error_message() {
        let builder = builder(|| {
            Ok(StatementContext {
                statement_text: "SELECT revenue / orders FROM sales".to_string(),
                object_ddls: vec!["CREATE TABLE sales (..)".to_string()],
            })
        });

        let ctx = builder.build(&incident()).await.unwrap();
        assert_eq!(ctx.error_message, "Division by zero");
        assert_eq!(ctx.object_ddls.len(), 1);
    }

    #[tokio::test]
    async fn missing_statement_is_context_unavailable() {
        let builder = builder(|| Err(ExternalError::NotFound));
        let err = builder.build(&incident()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ContextUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_statement_text_is_context_unavailable() {
        let builder = builder(|| {
            Ok(StatementContext {
                statement_text: "   ".to_string(),
                object_ddls: vec![],
            })
        });
        let err = builder.build(&incident()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ContextUnavailable(_)));
    }

    #[tokio::test]
    async fn blank_query_reference_short_circuits() {
        let builder = builder(|| unreachable!("warehouse must not be called"));
        let mut incident = incident();
        incident.latest_event.query_reference = String::new();
        let err = builder.build(&incident).await.unwrap_err();
        assert!(matches!(err, PipelineError::ContextUnavailable(_)));
    }
}
