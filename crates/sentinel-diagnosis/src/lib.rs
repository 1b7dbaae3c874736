//! Sentinel Diagnosis Engine
//!
//! Turns a diagnostic bundle into a structured diagnosis:
//! - **prompt**: fixed-structure prompt requesting three labeled sections
//! - **parser**: strict, order-tolerant section extraction from untrusted text
//! - **classify**: rule-based category assignment from the error text
//! - **engine**: bounded malformed-response retry over a [`ModelClient`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sentinel_diagnosis::{DiagnosisEngine, EngineConfig};
//!
//! # async fn example(client: std::sync::Arc<dyn sentinel_diagnosis::ModelClient>,
//! #                  context: sentinel_model::DiagnosticContext) {
//! let engine = DiagnosisEngine::new(client, EngineConfig::default());
//! let diagnosis = engine.diagnose(&context).await.unwrap();
//! assert!(diagnosis.is_complete());
//! # }
//! ```

#![warn(missing_docs)]

pub mod classify;
pub mod engine;
pub mod error;
pub mod parser;
pub mod prompt;

// Re-exports
pub use classify::classify;
pub use engine::{DiagnosisEngine, EngineConfig, ModelClient};
pub use error::{DiagnosisError, MalformedResponse, ModelError};
pub use parser::{parse_response, ParsedSections};
pub use prompt::{build_prompt, build_retry_prompt, SECTION_LABELS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
