//! Claims DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, Currency, SubjectId};
use domain_claims::{
    Claim, ClaimStatus, ClaimType, Decision, DocumentRef, RiskLevel, ScoringState, SubmitClaim,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    #[validate(length(min = 1, max = 32))]
    pub claim_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[validate(length(min = 1, max = 50))]
    pub documents: Vec<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

impl From<SubmitClaimRequest> for SubmitClaim {
    fn from(request: SubmitClaimRequest) -> Self {
        SubmitClaim {
            claim_type: request.claim_type,
            fields: request.fields,
            documents: request.documents,
            amount: request.amount,
            currency: request.currency,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    #[validate(length(min = 1, max = 16))]
    pub decision: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub claim_type: ClaimType,
    pub claimant_id: SubjectId,
    pub amount: Decimal,
    pub currency: Currency,
    pub fields: BTreeMap<String, String>,
    pub documents: Vec<DocumentRef>,
    pub risk_score: f64,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub scoring: ScoringState,
    pub status: ClaimStatus,
    pub decision_history: Vec<Decision>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            claim_id: claim.id,
            claim_type: claim.claim_type,
            claimant_id: claim.claimant_id,
            amount: claim.amount.amount(),
            currency: claim.amount.currency(),
            fields: claim.fields,
            documents: claim.documents,
            risk_score: claim.risk_score.value(),
            fraud_score: claim.fraud_score.value(),
            risk_level: RiskLevel::from_score(claim.fraud_score),
            scoring: claim.scoring,
            status: claim.status,
            decision_history: claim.history.as_slice().to_vec(),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub count: usize,
    pub claims: Vec<ClaimResponse>,
}

impl From<Vec<Claim>> for ClaimListResponse {
    fn from(claims: Vec<Claim>) -> Self {
        Self {
            count: claims.len(),
            claims: claims.into_iter().map(ClaimResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_utils::TestClaimBuilder;

    #[test]
    fn test_submit_request_defaults_currency() {
        let request: SubmitClaimRequest = serde_json::from_value(serde_json::json!({
            "claim_type": "Motor",
            "documents": ["fir-copy"],
            "amount": "35000.75"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        let submit = SubmitClaim::from(request);
        assert_eq!(submit.currency, Currency::INR);
        assert_eq!(submit.amount, dec!(35000.75));
        assert!(submit.fields.is_empty());
    }

    #[test]
    fn test_submit_request_needs_documents() {
        let request: SubmitClaimRequest = serde_json::from_value(serde_json::json!({
            "claim_type": "Health",
            "documents": [],
            "amount": 100
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_flattens_money_and_scores() {
        let claim = TestClaimBuilder::new()
            .with_amount(dec!(280000), Currency::INR)
            .with_fraud(0.82)
            .build();
        let response = ClaimResponse::from(claim.clone());

        assert_eq!(response.claim_id, claim.id);
        assert_eq!(response.amount, dec!(280000));
        assert_eq!(response.fraud_score, 0.82);
        assert_eq!(response.risk_level, RiskLevel::High);
        assert!(response.decision_history.is_empty());
    }
}
