//! Sentinel Data Model
//!
//! Shared types for the investigation pipeline:
//! - **FailureEvent**: raw telemetry from the failure source
//! - **Incident**: deduplicated failure record per task
//! - **Diagnosis / DiagnosticContext**: structured model output
//! - **CostProjection**: pure cost-impact arithmetic results
//! - **Investigation**: aggregate root with an explicit lifecycle
//! - **RunSummary**: the single outward-facing contract
//!
//! # Example
//!
//! ```rust
//! use sentinel_model::{Fingerprint, Incident, Investigation, RunId};
//! # use sentinel_model::{FailureEvent, TaskState};
//! # use chrono::Utc;
//! # let event = FailureEvent {
//! #     task_name: "task_broken_division".into(),
//! #     state: TaskState::Failed,
//! #     error_code: None,
//! #     error_message: "Division by zero".into(),
//! #     scheduled_time: Utc::now(),
//! #     completed_time: None,
//! #     execution_time_seconds: 120.0,
//! #     warehouse_size: "X-Small".into(),
//! #     query_reference: "qid-1".into(),
//! # };
//!
//! let incident = Incident::first_seen(event);
//! let investigation = Investigation::open(RunId::new(), incident);
//! assert_eq!(investigation.state().to_string(), "collected");
//! ```

#![warn(missing_docs)]

pub mod approval;
pub mod cost;
pub mod diagnosis;
pub mod event;
pub mod ids;
pub mod incident;
pub mod investigation;
pub mod notification;
pub mod summary;

// Re-exports
pub use approval::{ApprovalState, Decision, DecisionRecord};
pub use cost::CostProjection;
pub use diagnosis::{Completeness, Diagnosis, DiagnosisCategory, DiagnosticContext};
pub use event::{FailureEvent, TaskState};
pub use ids::{Fingerprint, InvestigationId, RunId};
pub use incident::Incident;
pub use investigation::{IllegalTransition, Investigation, InvestigationState};
pub use notification::{DeliveryStatus, NotificationPayload, NotificationRecord};
pub use summary::{IncidentReport, RunCounters, RunSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Sentinel data model
    pub use crate::{
        ApprovalState, CostProjection, Decision, Diagnosis, DiagnosisCategory, DiagnosticContext,
        FailureEvent, Fingerprint, Incident, Investigation, InvestigationId, InvestigationState,
        RunId, RunSummary, TaskState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
