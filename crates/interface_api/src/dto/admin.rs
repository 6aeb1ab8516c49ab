//! Admin DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_claims::ClaimStatistics;

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub statistics: ClaimStatistics,
    /// Percent of decided claims that were approved
    pub approval_rate: Option<Decimal>,
}

impl From<ClaimStatistics> for StatisticsResponse {
    fn from(statistics: ClaimStatistics) -> Self {
        Self {
            approval_rate: statistics.approval_rate(),
            statistics,
        }
    }
}

/// Scorer callback body for claims submitted while scoring was unavailable
#[derive(Debug, Deserialize)]
pub struct AttachScoresRequest {
    pub risk_score: f64,
    pub fraud_score: f64,
}
