//! Portfolio statistics for the admin dashboard

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{Currency, Money};

use crate::claim::{Claim, ClaimStatus, ClaimType};
use crate::triage::Threshold;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimStatistics {
    pub total_claims: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub by_type: BTreeMap<ClaimType, usize>,
    /// Pending claims at or above the review threshold
    pub flagged_for_review: usize,
    /// Pending claims below the review threshold
    pub cleared: usize,
    pub awaiting_score: usize,
    pub total_claimed: BTreeMap<Currency, Decimal>,
    pub review_threshold: Threshold,
}

impl ClaimStatistics {
    pub fn compute(claims: &[Claim], threshold: Threshold) -> Self {
        let mut stats = Self {
            total_claims: claims.len(),
            pending: 0,
            approved: 0,
            rejected: 0,
            by_type: ClaimType::ALL.into_iter().map(|t| (t, 0)).collect(),
            flagged_for_review: 0,
            cleared: 0,
            awaiting_score: 0,
            total_claimed: BTreeMap::new(),
            review_threshold: threshold,
        };

        for claim in claims {
            match claim.status {
                ClaimStatus::Pending => {
                    stats.pending += 1;
                    if threshold.admits(claim.fraud_score) {
                        stats.flagged_for_review += 1;
                    } else {
                        stats.cleared += 1;
                    }
                }
                ClaimStatus::Approved => stats.approved += 1,
                ClaimStatus::Rejected => stats.rejected += 1,
            }
            *stats.by_type.entry(claim.claim_type).or_insert(0) += 1;
            if claim.scoring.is_awaiting() {
                stats.awaiting_score += 1;
            }
            stats.add_claimed(claim.amount);
        }

        stats
    }

    /// Adds to the per-currency total, saturating instead of overflowing
    fn add_claimed(&mut self, amount: Money) {
        let currency = amount.currency();
        let running = self
            .total_claimed
            .get(&currency)
            .map_or_else(|| Money::zero(currency), |total| Money::new(*total, currency));
        let total = running.checked_add(amount).unwrap_or_else(|e| {
            warn!(currency = %currency, error = %e, "Claimed total saturated");
            Money::new(Decimal::MAX, currency)
        });
        self.total_claimed.insert(currency, total.amount());
    }

    /// Share of decided claims that were approved, in percent
    pub fn approval_rate(&self) -> Option<Decimal> {
        let decided = self.approved + self.rejected;
        if decided == 0 {
            return None;
        }
        Some((Decimal::from(self.approved) * Decimal::from(100) / Decimal::from(decided)).round_dp(1))
    }
}
