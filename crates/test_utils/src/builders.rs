//! Test Data Builders
//!
//! Builds claims in any state while letting a test name only the fields it
//! cares about.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, Currency, Money, SubjectId};
use domain_access::Role;
use domain_claims::{
    Claim, ClaimStatus, ClaimType, Decision, DecisionHistory, DocumentRef, Score, ScoringState,
    Verdict,
};

use crate::fixtures::TemporalFixtures;

/// Builder for claims
///
/// Defaults to a scored, pending Health claim from `john` with zero scores.
pub struct TestClaimBuilder {
    id: ClaimId,
    claim_type: ClaimType,
    claimant: String,
    amount: Decimal,
    currency: Currency,
    fields: BTreeMap<String, String>,
    documents: Vec<String>,
    risk: f64,
    fraud: f64,
    scoring: ScoringState,
    status: ClaimStatus,
    created_at: DateTime<Utc>,
    version: u64,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    pub fn new() -> Self {
        Self {
            id: ClaimId::new_v7(),
            claim_type: ClaimType::Health,
            claimant: "john".to_string(),
            amount: dec!(120000),
            currency: Currency::INR,
            fields: BTreeMap::from([
                ("policy_number".to_string(), "POL-2024-0001".to_string()),
                ("hospital_name".to_string(), "Apollo Hospital".to_string()),
            ]),
            documents: vec!["doc-bill-1".to_string()],
            risk: 0.0,
            fraud: 0.0,
            scoring: ScoringState::Scored,
            status: ClaimStatus::Pending,
            created_at: TemporalFixtures::now(),
            version: 0,
        }
    }

    pub fn with_id(mut self, id: ClaimId) -> Self {
        self.id = id;
        self
    }

    pub fn with_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    pub fn with_claimant(mut self, claimant: impl Into<String>) -> Self {
        self.claimant = claimant.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal, currency: Currency) -> Self {
        self.amount = amount;
        self.currency = currency;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_documents(mut self, documents: &[&str]) -> Self {
        self.documents = documents.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_risk(mut self, risk: f64) -> Self {
        self.risk = risk;
        self
    }

    pub fn with_fraud(mut self, fraud: f64) -> Self {
        self.fraud = fraud;
        self
    }

    pub fn awaiting_score(mut self) -> Self {
        self.scoring = ScoringState::AwaitingScore;
        self
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Submitted `minutes` before the fixture reference instant
    pub fn submitted_minutes_ago(self, minutes: i64) -> Self {
        self.created_at(TemporalFixtures::minutes_ago(minutes))
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Builds the claim
    ///
    /// A decided status gets a matching single-entry history so the claim
    /// looks like it went through the lifecycle.
    pub fn build(self) -> Claim {
        let history = match self.status {
            ClaimStatus::Pending => DecisionHistory::default(),
            ClaimStatus::Approved | ClaimStatus::Rejected => {
                let verdict = if self.status == ClaimStatus::Approved {
                    Verdict::Approve
                } else {
                    Verdict::Reject
                };
                DecisionHistory::from_persisted(vec![Decision {
                    reviewer_id: SubjectId::new("priya").unwrap(),
                    reviewer_role: Role::Reviewer,
                    verdict,
                    note: None,
                    decided_at: self.created_at + Duration::hours(1),
                }])
            }
        };
        let updated_at = history.last().map_or(self.created_at, |d| d.decided_at);

        Claim {
            id: self.id,
            claim_type: self.claim_type,
            claimant_id: SubjectId::new(self.claimant).unwrap(),
            amount: Money::new(self.amount, self.currency),
            fields: self.fields,
            documents: self
                .documents
                .into_iter()
                .map(|d| DocumentRef::new(d).unwrap())
                .collect(),
            risk_score: Score::new(self.risk).unwrap(),
            fraud_score: Score::new(self.fraud).unwrap(),
            scoring: self.scoring,
            status: self.status,
            history,
            created_at: self.created_at,
            updated_at,
            version: self.version,
        }
    }
}
