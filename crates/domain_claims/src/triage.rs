//! Fraud triage for the manual-review queue
//!
//! The queue is never stored. Each read selects the pending claims whose fraud
//! score is at or above the threshold and orders them:
//!
//! 1. fraud score, highest first
//! 2. submission time, oldest first
//! 3. claim id, ascending
//!
//! The last key only matters for claims submitted in the same instant; it
//! makes the order total so identical inputs always produce identical output.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money, SubjectId};

use crate::claim::{Claim, ClaimType, Score, ScoringState};
use crate::error::ClaimError;

/// Minimum fraud score for a pending claim to need manual review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Reviewer portal default
    pub const DEFAULT: Threshold = Threshold(0.6);

    /// # Errors
    ///
    /// `ClaimError::InvalidThreshold` outside `[0, 1]`, including NaN
    pub fn new(value: f64) -> Result<Self, ClaimError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ClaimError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn admits(&self, score: Score) -> bool {
        score.value() >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ClaimError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> f64 {
        threshold.0
    }
}

/// Coarse banding of a fraud score for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    const HIGH_FROM: f64 = 0.7;
    const MEDIUM_FROM: f64 = 0.4;

    pub fn from_score(score: Score) -> Self {
        match score.value() {
            v if v >= Self::HIGH_FROM => RiskLevel::High,
            v if v >= Self::MEDIUM_FROM => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        })
    }
}

/// One row of the review queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub claim_id: ClaimId,
    pub claim_type: ClaimType,
    pub claimant_id: SubjectId,
    pub amount: Money,
    pub risk_score: Score,
    pub fraud_score: Score,
    pub risk_level: RiskLevel,
    pub scoring: ScoringState,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Claim> for ReviewQueueEntry {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_id: claim.id,
            claim_type: claim.claim_type,
            claimant_id: claim.claimant_id.clone(),
            amount: claim.amount,
            risk_score: claim.risk_score,
            fraud_score: claim.fraud_score,
            risk_level: RiskLevel::from_score(claim.fraud_score),
            scoring: claim.scoring,
            document_count: claim.documents.len(),
            created_at: claim.created_at,
        }
    }
}

/// Review priority: higher fraud first, then older first, then by id
pub fn review_order(a: &Claim, b: &Claim) -> Ordering {
    b.fraud_score
        .cmp(&a.fraud_score)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Builds the manual-review queue from a snapshot of claims
///
/// Includes a claim iff it is pending and its fraud score is at least
/// `threshold`. Decided claims never appear, whatever their score.
///
/// # Errors
///
/// `ClaimError::InvalidThreshold` if `threshold` is outside `[0, 1]`
pub fn queue(claims: &[Claim], threshold: f64) -> Result<Vec<ReviewQueueEntry>, ClaimError> {
    let threshold = Threshold::new(threshold)?;
    Ok(queue_with(claims, threshold))
}

/// [`queue`] for an already-validated threshold
pub fn queue_with(claims: &[Claim], threshold: Threshold) -> Vec<ReviewQueueEntry> {
    let mut selected: Vec<&Claim> = claims
        .iter()
        .filter(|c| c.is_pending() && threshold.admits(c.fraud_score))
        .collect();
    selected.sort_by(|a, b| review_order(a, b));
    selected.into_iter().map(ReviewQueueEntry::from).collect()
}
