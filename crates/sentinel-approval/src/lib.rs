//! Sentinel Approval Gate
//!
//! Durable human-in-the-loop barrier:
//! - **gate**: idempotent `record_decision` / `get_state` over pending
//!   investigations
//! - **store**: pluggable persistence with an in-memory implementation
//!   that snapshots to JSON, so a restart keeps pending investigations
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sentinel_approval::{ApprovalGate, MemoryDecisionStore};
//! use sentinel_model::{ApprovalState, Decision, InvestigationId};
//!
//! let gate = ApprovalGate::new(Arc::new(MemoryDecisionStore::new()));
//! let id = InvestigationId::new();
//! gate.submit(id);
//!
//! let state = gate.record_decision(id, Decision::Approved, "reviewer").unwrap();
//! assert_eq!(state, ApprovalState::Approved);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod gate;
pub mod store;

// Re-exports
pub use error::ApprovalError;
pub use gate::ApprovalGate;
pub use store::{DecisionStore, GateEntry, MemoryDecisionStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
