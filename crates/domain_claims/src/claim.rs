//! Claim aggregate

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{ClaimId, Money, SubjectId};
use domain_access::Role;

use crate::error::ClaimError;

/// Line of business a claim is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimType {
    Health,
    Motor,
    Property,
}

impl ClaimType {
    pub const ALL: [ClaimType; 3] = [ClaimType::Health, ClaimType::Motor, ClaimType::Property];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Health => "Health",
            ClaimType::Motor => "Motor",
            ClaimType::Property => "Property",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ClaimType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ClaimError::Validation(format!(
                    "unknown claim type '{s}': expected Health, Motor, or Property"
                ))
            })
    }
}

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Submitted, awaiting a decision
    Pending,
    /// Approved by a reviewer or admin
    Approved,
    /// Rejected by a reviewer or admin
    Rejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 3] = [ClaimStatus::Pending, ClaimStatus::Approved, ClaimStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClaimStatus::Pending)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("score {0} is outside [0, 1]")]
pub struct ScoreOutOfRange(pub f64);

/// A risk or fraud signal in `[0, 1]`; higher is more suspicious
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);

    pub fn new(value: f64) -> Result<Self, ScoreOutOfRange> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.0
    }
}

// NaN never passes `Score::new`, so total ordering is sound.
impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Output of the fraud/risk scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub risk: Score,
    pub fraud: Score,
}

impl ScoreCard {
    pub fn new(risk: f64, fraud: f64) -> Result<Self, ClaimError> {
        let risk = Score::new(risk).map_err(|e| ClaimError::Validation(format!("risk {e}")))?;
        let fraud = Score::new(fraud).map_err(|e| ClaimError::Validation(format!("fraud {e}")))?;
        Ok(Self { risk, fraud })
    }

    pub fn zero() -> Self {
        Self {
            risk: Score::ZERO,
            fraud: Score::ZERO,
        }
    }
}

/// Whether the scorer has produced this claim's scores yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringState {
    /// Scores came from the scorer and are final
    Scored,
    /// Scorer was unavailable; scores hold configured defaults until attached
    AwaitingScore,
}

impl ScoringState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, ScoringState::AwaitingScore)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringState::Scored => "scored",
            ScoringState::AwaitingScore => "awaiting_score",
        }
    }
}

impl FromStr for ScoringState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scored" => Ok(ScoringState::Scored),
            "awaiting_score" => Ok(ScoringState::AwaitingScore),
            other => Err(other.to_string()),
        }
    }
}

/// Reviewer verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Reject => "reject",
        }
    }

    /// Status a pending claim moves to under this verdict
    pub fn resulting_status(&self) -> ClaimStatus {
        match self {
            Verdict::Approve => ClaimStatus::Approved,
            Verdict::Reject => ClaimStatus::Rejected,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Verdict::Approve),
            "reject" => Ok(Verdict::Reject),
            _ => Err(ClaimError::InvalidDecision(s.to_string())),
        }
    }
}

/// Immutable record of one reviewer decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub reviewer_id: SubjectId,
    pub reviewer_role: Role,
    #[serde(rename = "decision")]
    pub verdict: Verdict,
    pub note: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// Append-only sequence of decisions
///
/// The only way to grow a history is [`Claim::decide`], which returns a new
/// claim; existing entries are never exposed mutably.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionHistory(Vec<Decision>);

impl DecisionHistory {
    /// Rebuilds a history read back from storage
    pub fn from_persisted(decisions: Vec<Decision>) -> Self {
        Self(decisions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Decision] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Decision> {
        self.0.last()
    }

    /// True when `prior` is an unmodified prefix of this history
    pub fn extends(&self, prior: &DecisionHistory) -> bool {
        self.0.len() >= prior.0.len() && self.0[..prior.0.len()] == prior.0[..]
    }

    fn appended(&self, decision: Decision) -> Self {
        let mut decisions = self.0.clone();
        decisions.push(decision);
        Self(decisions)
    }
}

/// Opaque reference to a supporting document held by the document service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(value: impl Into<String>) -> Result<Self, ClaimError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ClaimError::Validation("document reference is blank".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted insurance claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier, never reused
    pub id: ClaimId,
    pub claim_type: ClaimType,
    pub claimant_id: SubjectId,
    /// Claimed amount
    pub amount: Money,
    /// Type-specific form fields
    pub fields: BTreeMap<String, String>,
    /// Supporting documents, in submission order, without duplicates
    pub documents: Vec<DocumentRef>,
    pub risk_score: Score,
    pub fraud_score: Score,
    pub scoring: ScoringState,
    pub status: ClaimStatus,
    pub history: DecisionHistory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every save
    pub version: u64,
}

impl Claim {
    /// Creates a freshly submitted claim with placeholder scores
    pub fn submitted(
        claim_type: ClaimType,
        claimant_id: SubjectId,
        amount: Money,
        fields: BTreeMap<String, String>,
        documents: Vec<DocumentRef>,
        unscored: ScoreCard,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            claim_type,
            claimant_id,
            amount,
            fields,
            documents,
            risk_score: unscored.risk,
            fraud_score: unscored.fraud,
            scoring: ScoringState::AwaitingScore,
            status: ClaimStatus::Pending,
            history: DecisionHistory::default(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn is_owned_by(&self, subject: &SubjectId) -> bool {
        &self.claimant_id == subject
    }

    /// Returns this claim with `decision` applied, leaving `self` untouched
    ///
    /// # Errors
    ///
    /// `ClaimError::InvalidTransition` unless the claim is pending.
    pub fn decide(&self, decision: Decision) -> Result<Claim, ClaimError> {
        if !self.is_pending() {
            return Err(ClaimError::InvalidTransition {
                claim_id: self.id,
                current: self.status,
            });
        }

        let mut next = self.clone();
        next.status = decision.verdict.resulting_status();
        next.updated_at = decision.decided_at;
        next.history = self.history.appended(decision);
        Ok(next)
    }

    /// Returns this claim carrying scorer output, leaving `self` untouched
    ///
    /// # Errors
    ///
    /// `ClaimError::Validation` if the claim has already been scored.
    pub fn with_scores(&self, card: ScoreCard, now: DateTime<Utc>) -> Result<Claim, ClaimError> {
        if self.scoring == ScoringState::Scored {
            return Err(ClaimError::Validation(format!(
                "claim {} has already been scored",
                self.id
            )));
        }

        let mut next = self.clone();
        next.risk_score = card.risk;
        next.fraud_score = card.fraud;
        next.scoring = ScoringState::Scored;
        next.updated_at = now;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn pending_claim() -> Claim {
        Claim::submitted(
            ClaimType::Health,
            SubjectId::new("claimer-1").unwrap(),
            Money::new(dec!(120000), Currency::INR),
            BTreeMap::from([("hospital_name".to_string(), "Apollo Hospital".to_string())]),
            vec![DocumentRef::new("doc-bill-1").unwrap()],
            ScoreCard::zero(),
            Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap(),
        )
    }

    fn decision(verdict: Verdict) -> Decision {
        Decision {
            reviewer_id: SubjectId::new("rev-1").unwrap(),
            reviewer_role: Role::Reviewer,
            verdict,
            note: Some("looks fine".to_string()),
            decided_at: Utc.with_ymd_and_hms(2024, 2, 16, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_submitted_claim_defaults() {
        let claim = pending_claim();
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.scoring, ScoringState::AwaitingScore);
        assert!(claim.history.is_empty());
        assert_eq!(claim.version, 0);
    }

    #[test]
    fn test_decide_approve_appends_history() {
        let claim = pending_claim();
        let decided = claim.decide(decision(Verdict::Approve)).unwrap();

        assert_eq!(decided.status, ClaimStatus::Approved);
        assert_eq!(decided.history.len(), 1);
        assert!(decided.history.extends(&claim.history));
        // original untouched
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert!(claim.history.is_empty());
    }

    #[test]
    fn test_decide_reject() {
        let decided = pending_claim().decide(decision(Verdict::Reject)).unwrap();
        assert_eq!(decided.status, ClaimStatus::Rejected);
        assert_eq!(decided.history.last().unwrap().verdict, Verdict::Reject);
    }

    #[test]
    fn test_decide_twice_is_invalid_transition() {
        let decided = pending_claim().decide(decision(Verdict::Approve)).unwrap();
        let err = decided.decide(decision(Verdict::Reject)).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::InvalidTransition { current: ClaimStatus::Approved, .. }
        ));
    }

    #[test]
    fn test_history_extends_detects_rewrites() {
        let once = pending_claim().decide(decision(Verdict::Approve)).unwrap();
        let mut tampered = once.history.as_slice().to_vec();
        tampered[0].note = Some("edited".to_string());
        let tampered = DecisionHistory::from_persisted(tampered);

        assert!(once.history.extends(&DecisionHistory::default()));
        assert!(!tampered.extends(&once.history));
    }

    #[test]
    fn test_verdict_parsing() {
        assert_eq!("approve".parse::<Verdict>().unwrap(), Verdict::Approve);
        assert_eq!("reject".parse::<Verdict>().unwrap(), Verdict::Reject);
        assert!(matches!(
            "escalate".parse::<Verdict>(),
            Err(ClaimError::InvalidDecision(v)) if v == "escalate"
        ));
    }

    #[test]
    fn test_verdict_parsing_is_exact() {
        for raw in ["APPROVE", "Approve", " reject", "reject\n", ""] {
            assert!(
                matches!(raw.parse::<Verdict>(), Err(ClaimError::InvalidDecision(ref v)) if v == raw),
                "{raw:?} should be refused"
            );
        }
    }

    #[test]
    fn test_claim_type_parsing() {
        assert_eq!("motor".parse::<ClaimType>().unwrap(), ClaimType::Motor);
        assert_eq!("Property".parse::<ClaimType>().unwrap(), ClaimType::Property);
        assert!(matches!("Life".parse::<ClaimType>(), Err(ClaimError::Validation(_))));
    }

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(0.0).is_ok());
        assert!(Score::new(1.0).is_ok());
        assert!(Score::new(1.01).is_err());
        assert!(Score::new(-0.1).is_err());
        assert!(Score::new(f64::NAN).is_err());
        assert!(serde_json::from_str::<Score>("1.5").is_err());
    }

    #[test]
    fn test_with_scores_only_once() {
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 11, 0, 0).unwrap();
        let scored = pending_claim()
            .with_scores(ScoreCard::new(0.58, 0.75).unwrap(), now)
            .unwrap();
        assert_eq!(scored.scoring, ScoringState::Scored);
        assert_eq!(scored.fraud_score.value(), 0.75);
        assert!(scored.with_scores(ScoreCard::zero(), now).is_err());
    }

    #[test]
    fn test_decision_serializes_verdict_as_decision() {
        let json = serde_json::to_value(decision(Verdict::Approve)).unwrap();
        assert_eq!(json["decision"], "approve");
        assert_eq!(json["reviewer_role"], "reviewer");
    }
}
