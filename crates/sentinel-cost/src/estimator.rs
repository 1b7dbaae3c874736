//! Cost estimation
//!
//! A pure function from execution metadata and the diagnosis category to
//! a cost projection. The improvement fractions are illustrative
//! heuristics, shipped as configuration rather than promised accuracy.

use crate::rates::{UnknownWarehouseTier, WarehouseTier};
use crate::schedule::executions_per_year;
use sentinel_model::{CostProjection, DiagnosisCategory};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Price of one credit in USD
    pub credit_price_usd: f64,
    /// Improvement fraction for arithmetic faults
    pub division_by_zero_fraction: f64,
    /// Improvement fraction for missing objects (fix restores the run)
    pub missing_object_fraction: f64,
    /// Improvement fraction for statements that never compile
    pub syntax_error_fraction: f64,
    /// Improvement fraction for permission failures
    pub permission_denied_fraction: f64,
    /// Improvement fraction for logic faults
    pub logic_error_fraction: f64,
    /// Improvement fraction for everything else
    pub other_fraction: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            credit_price_usd: 3.0,
            division_by_zero_fraction: 0.05,
            missing_object_fraction: 1.0,
            syntax_error_fraction: 1.0,
            permission_denied_fraction: 0.0,
            logic_error_fraction: 0.05,
            other_fraction: 0.0,
        }
    }
}

impl CostConfig {
    /// With credit price
    #[inline]
    #[must_use]
    pub fn with_credit_price(mut self, usd: f64) -> Self {
        self.credit_price_usd = usd;
        self
    }

    /// Heuristic improvement fraction for a category
    #[must_use]
    pub fn improvement_fraction(&self, category: DiagnosisCategory) -> f64 {
        let fraction = match category {
            DiagnosisCategory::DivisionByZero => self.division_by_zero_fraction,
            DiagnosisCategory::MissingObject => self.missing_object_fraction,
            DiagnosisCategory::SyntaxError => self.syntax_error_fraction,
            DiagnosisCategory::PermissionDenied => self.permission_denied_fraction,
            DiagnosisCategory::LogicError => self.logic_error_fraction,
            DiagnosisCategory::Other => self.other_fraction,
        };
        fraction.clamp(0.0, 1.0)
    }
}

/// Computes cost projections from execution metadata
#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    config: CostConfig,
}

impl CostEstimator {
    /// Create an estimator with the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    /// Project the annual cost impact of one incident
    ///
    /// Zero execution time is valid and yields a zero-credit projection.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownWarehouseTier`] when the tier label is not in the
    /// rate table; callers proceed with a null projection.
    pub fn estimate(
        &self,
        execution_time_seconds: f64,
        warehouse_size: &str,
        category: DiagnosisCategory,
        schedule: &str,
    ) -> Result<CostProjection, UnknownWarehouseTier> {
        let tier: WarehouseTier = warehouse_size.parse()?;
        let runs_per_year = executions_per_year(schedule);

        let credits_per_run =
            (execution_time_seconds.max(0.0) / SECONDS_PER_HOUR) * tier.credits_per_hour();
        #[allow(clippy::cast_precision_loss)]
        let annual_credits = credits_per_run * runs_per_year as f64;
        let improvement_fraction = self.config.improvement_fraction(category);
        let projected_annual_savings_usd =
            annual_credits * improvement_fraction * self.config.credit_price_usd;

        Ok(CostProjection {
            credits_per_run,
            executions_per_year: runs_per_year,
            annual_credits,
            improvement_fraction,
            projected_annual_savings_usd,
        })
    }
}
