//! External collaborator interfaces
//!
//! The warehouse, the notification channel and the failure source are
//! specified only by what the pipeline needs from them. Transport,
//! authentication and query mechanics live behind these traits.

use async_trait::async_trait;
use sentinel_model::{FailureEvent, NotificationPayload};

/// Failure from any external collaborator
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    /// Connection error, timeout, rate-limit reply; worth retrying
    #[error("transient external failure: {0}")]
    Transient(String),

    /// The collaborator rejected the request outright
    #[error("external call rejected: {0}")]
    Terminal(String),

    /// The requested object does not exist on the collaborator's side
    #[error("requested object not found")]
    NotFound,
}

/// Statement-level context the warehouse can resolve for a query reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementContext {
    /// Text of the referenced statement
    pub statement_text: String,
    /// DDL of objects the statement references, where resolvable
    pub object_ddls: Vec<String>,
}

/// Source of raw failure telemetry
#[async_trait]
pub trait FailureSource: Send + Sync {
    /// Fetch all task-run records for the lookback window
    ///
    /// The pipeline filters to `FAILED` itself; sources may pre-filter.
    async fn fetch_events(&self, lookback_hours: u32) -> Result<Vec<FailureEvent>, ExternalError>;
}

/// Warehouse metadata retrieval
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Resolve statement text and referenced-object DDL for a query
    ///
    /// `NotFound` means the reference cannot be located at all; that is a
    /// recoverable per-incident condition, not a transport failure.
    async fn statement_context(
        &self,
        query_reference: &str,
    ) -> Result<StatementContext, ExternalError>;
}

/// Outbound notification channel
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver one rendered payload
    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), ExternalError>;
}
