//! Warehouse tier rate table
//!
//! Credit consumption per hour doubles with each size step, matching the
//! platform's standard pricing sheet.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Compute-size class with a fixed credit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarehouseTier {
    /// 1 credit/hour
    XSmall,
    /// 2 credits/hour
    Small,
    /// 4 credits/hour
    Medium,
    /// 8 credits/hour
    Large,
    /// 16 credits/hour
    XLarge,
    /// 32 credits/hour
    X2Large,
    /// 64 credits/hour
    X3Large,
    /// 128 credits/hour
    X4Large,
}

impl WarehouseTier {
    /// Credits consumed per hour of runtime on this tier
    #[must_use]
    pub fn credits_per_hour(self) -> f64 {
        match self {
            Self::XSmall => 1.0,
            Self::Small => 2.0,
            Self::Medium => 4.0,
            Self::Large => 8.0,
            Self::XLarge => 16.0,
            Self::X2Large => 32.0,
            Self::X3Large => 64.0,
            Self::X4Large => 128.0,
        }
    }
}

/// Tier label the rate table does not know
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown warehouse tier: {0:?}")]
pub struct UnknownWarehouseTier(pub String);

impl FromStr for WarehouseTier {
    type Err = UnknownWarehouseTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Labels arrive as "X-Small", "XSMALL", "2X-Large" and similar.
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "XSMALL" => Ok(Self::XSmall),
            "SMALL" => Ok(Self::Small),
            "MEDIUM" => Ok(Self::Medium),
            "LARGE" => Ok(Self::Large),
            "XLARGE" => Ok(Self::XLarge),
            "2XLARGE" | "XXLARGE" => Ok(Self::X2Large),
            "3XLARGE" | "XXXLARGE" => Ok(Self::X3Large),
            "4XLARGE" | "XXXXLARGE" => Ok(Self::X4Large),
            _ => Err(UnknownWarehouseTier(s.to_string())),
        }
    }
}
