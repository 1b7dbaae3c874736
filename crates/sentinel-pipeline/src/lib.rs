//! Sentinel Pipeline
//!
//! End-to-end orchestration of the task-failure investigation pipeline:
//! - **orchestrator**: fixed-order pass over collected incidents with
//!   per-incident failure isolation and run summaries
//! - **external**: async traits for the failure source, warehouse
//!   client, and notification channel
//! - **retry**: bounded retry with exponential backoff and jitter,
//!   model-call rate limiting, run cancellation
//! - **context**: diagnostic context assembly from the warehouse
//! - **notify**: payload rendering and at-least-once delivery
//! - **config**: TOML-backed pipeline tuning
//! - **secrets**: credential resolution for external collaborators
//! - **simulator**: canned end-to-end demo scenario behind `sentinel demo`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sentinel_approval::MemoryDecisionStore;
//! use sentinel_pipeline::{Orchestrator, PipelineConfig};
//! # use sentinel_pipeline::external::{FailureSource, NotificationChannel, WarehouseClient};
//! # use sentinel_diagnosis::ModelClient;
//! # async fn run(
//! #     source: Arc<dyn FailureSource>,
//! #     warehouse: Arc<dyn WarehouseClient>,
//! #     model: Arc<dyn ModelClient>,
//! #     channel: Arc<dyn NotificationChannel>,
//! # ) -> Result<(), sentinel_pipeline::PipelineError> {
//! let store = Arc::new(MemoryDecisionStore::new());
//! let orchestrator = Orchestrator::new(
//!     PipelineConfig::default(),
//!     source,
//!     warehouse,
//!     model,
//!     channel,
//!     store,
//! );
//! let outcome = orchestrator.run().await?;
//! println!("{} incidents investigated", outcome.summary.counters.collected);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod external;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod retry;
pub mod secrets;
pub mod simulator;

// Re-exports
pub use config::PipelineConfig;
pub use context::ContextBuilder;
pub use error::PipelineError;
pub use external::{ExternalError, FailureSource, NotificationChannel, StatementContext, WarehouseClient};
pub use model::GovernedModelClient;
pub use notify::Notifier;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use retry::{CancellationFlag, RateLimiter, RetryPolicy};
pub use secrets::{ChainResolver, EnvSecrets, SecretError, SecretResolver, StaticSecrets};

/// Commonly used pipeline types
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::PipelineError;
    pub use crate::external::{FailureSource, NotificationChannel, WarehouseClient};
    pub use crate::orchestrator::{Orchestrator, RunOutcome};
    pub use crate::retry::CancellationFlag;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
