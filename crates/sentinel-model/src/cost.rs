//! Cost-impact projections
//!
//! Every field is a pure function of the estimator's inputs; a projection
//! carries no hidden state and can be recomputed at any time.

use serde::{Deserialize, Serialize};

/// Compute-cost projection for one incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostProjection {
    /// Credits consumed by one run of the task
    pub credits_per_run: f64,
    /// Annualized run count derived from the task schedule
    pub executions_per_year: u64,
    /// credits_per_run * executions_per_year
    pub annual_credits: f64,
    /// Heuristic improvement fraction for the diagnosis category (0..=1)
    pub improvement_fraction: f64,
    /// annual_credits * improvement_fraction * credit price
    pub projected_annual_savings_usd: f64,
}

impl CostProjection {
    /// Whether the projection predicts any savings at all
    #[inline]
    #[must_use]
    pub fn has_savings(&self) -> bool {
        self.projected_annual_savings_usd > 0.0
    }
}
