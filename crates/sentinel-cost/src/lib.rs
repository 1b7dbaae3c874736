//! Sentinel Cost Estimator
//!
//! Deterministic cost-impact projection from execution metadata:
//! - **rates**: fixed warehouse-tier credit table (doubling per step)
//! - **schedule**: `"N MINUTE|HOUR|DAY"` strings to annual run counts
//! - **estimator**: pure projection arithmetic with a configurable
//!   category-improvement heuristic
//!
//! # Example
//!
//! ```rust
//! use sentinel_cost::{CostConfig, CostEstimator};
//! use sentinel_model::DiagnosisCategory;
//!
//! let estimator = CostEstimator::new(CostConfig::default());
//! let projection = estimator
//!     .estimate(3600.0, "X-Small", DiagnosisCategory::Other, "1 DAY")
//!     .unwrap();
//! assert!((projection.credits_per_run - 1.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod estimator;
pub mod rates;
pub mod schedule;

// Re-exports
pub use estimator::{CostConfig, CostEstimator};
pub use rates::{UnknownWarehouseTier, WarehouseTier};
pub use schedule::{executions_per_year, DEFAULT_EXECUTIONS_PER_YEAR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
