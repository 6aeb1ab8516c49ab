//! Lifecycle engine tests against the in-memory store

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, Currency, ManualClock, Money};
use domain_access::Role;
use domain_claims::{
    ClaimError, ClaimLifecycle, ClaimStatus, ClaimStore, ClaimType, InMemoryClaimStore,
    LifecycleConfig, ScoreCard, ScoringState, SubmitClaim, Verdict,
};
use test_utils::{
    assert_forbidden, SessionFixtures, StaticScorer, TemporalFixtures, TestClaimBuilder,
    UnavailableScorer,
};

fn health_submission() -> SubmitClaim {
    SubmitClaim {
        claim_type: "Health".to_string(),
        fields: BTreeMap::from([
            ("policy_number".to_string(), "POL-2024-0001".to_string()),
            ("hospital_name".to_string(), " Apollo Hospital ".to_string()),
        ]),
        documents: vec!["doc-bill-1".to_string(), "doc-discharge-1".to_string()],
        amount: dec!(120000),
        currency: Currency::INR,
    }
}

async fn engine_with(claims: Vec<domain_claims::Claim>) -> (ClaimLifecycle, Arc<InMemoryClaimStore>, ManualClock) {
    let store = Arc::new(InMemoryClaimStore::with_claims(claims).await);
    let clock = TemporalFixtures::clock();
    let engine = ClaimLifecycle::new(store.clone(), LifecycleConfig::default())
        .with_clock(Arc::new(clock.clone()));
    (engine, store, clock)
}

// ============================================================================
// Submission
// ============================================================================

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_creates_pending_claim() {
        let (engine, store, _) = engine_with(vec![]).await;
        let scorer = Arc::new(StaticScorer::new(0.58, 0.75));
        let engine = engine.with_scorer(scorer.clone());

        let claim = engine
            .submit(&SessionFixtures::claimer(), health_submission())
            .await
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.claim_type, ClaimType::Health);
        assert_eq!(claim.claimant_id.as_str(), "john");
        assert_eq!(claim.scoring, ScoringState::Scored);
        assert_eq!(claim.fraud_score.value(), 0.75);
        assert_eq!(claim.risk_score.value(), 0.58);
        assert_eq!(claim.fields["hospital_name"], "Apollo Hospital");
        assert_eq!(claim.created_at, TemporalFixtures::now());
        assert!(claim.history.is_empty());
        assert_eq!(scorer.calls(), 1);

        let stored = store.get(claim.id).await.unwrap().unwrap();
        assert_eq!(stored, claim);
    }

    #[tokio::test]
    async fn test_submit_without_scorer_awaits_score() {
        let (engine, _, _) = engine_with(vec![]).await;

        let claim = engine
            .submit(&SessionFixtures::claimer(), health_submission())
            .await
            .unwrap();

        assert_eq!(claim.scoring, ScoringState::AwaitingScore);
        assert_eq!(claim.risk_score, ScoreCard::zero().risk);
        assert_eq!(claim.fraud_score, ScoreCard::zero().fraud);
    }

    #[tokio::test]
    async fn test_submit_with_failing_scorer_uses_configured_defaults() {
        let store = Arc::new(InMemoryClaimStore::new());
        let config = LifecycleConfig {
            unscored: ScoreCard::new(0.5, 0.6).unwrap(),
            ..LifecycleConfig::default()
        };
        let engine = ClaimLifecycle::new(store, config).with_scorer(Arc::new(UnavailableScorer));

        let claim = engine
            .submit(&SessionFixtures::claimer(), health_submission())
            .await
            .unwrap();

        assert_eq!(claim.scoring, ScoringState::AwaitingScore);
        assert_eq!(claim.fraud_score.value(), 0.6);
    }

    #[tokio::test]
    async fn test_reviewer_cannot_submit() {
        let (engine, store, _) = engine_with(vec![]).await;

        let err = engine
            .submit(&SessionFixtures::reviewer(), health_submission())
            .await
            .unwrap_err();

        assert_forbidden(&err, Role::Reviewer);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let (engine, store, _) = engine_with(vec![]).await;
        let claimer = SessionFixtures::claimer();

        let mut unknown_type = health_submission();
        unknown_type.claim_type = "Life".to_string();
        let mut no_documents = health_submission();
        no_documents.documents.clear();
        let mut zero_amount = health_submission();
        zero_amount.amount = dec!(0);

        for request in [unknown_type, no_documents, zero_amount] {
            let err = engine.submit(&claimer, request).await.unwrap_err();
            assert!(matches!(err, ClaimError::Validation(_)), "got {err:?}");
        }
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_amount_limit() {
        let (engine, store, _) = engine_with(vec![]).await;
        let claimer = SessionFixtures::claimer();

        let mut oversized = health_submission();
        oversized.amount = Decimal::MAX;
        let err = engine.submit(&claimer, oversized).await.unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)), "got {err:?}");
        assert!(!err.is_retryable());
        assert!(store.list_all().await.unwrap().is_empty());

        let mut largest = health_submission();
        largest.amount = Money::MAX_AMOUNT;
        for _ in 0..2 {
            engine.submit(&claimer, largest.clone()).await.unwrap();
        }

        let stats = engine.statistics(&SessionFixtures::admin()).await.unwrap();
        assert_eq!(stats.total_claimed[&Currency::INR], Money::MAX_AMOUNT * dec!(2));
    }

    #[tokio::test]
    async fn test_submit_store_down() {
        let (engine, store, _) = engine_with(vec![]).await;
        store.set_unavailable(true);

        let err = engine
            .submit(&SessionFixtures::claimer(), health_submission())
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::StoreFailure(_)));
    }
}

// ============================================================================
// Decisions
// ============================================================================

mod decide_tests {
    use super::*;

    #[tokio::test]
    async fn test_reviewer_approves_pending_claim() {
        let claim = TestClaimBuilder::new().with_fraud(0.75).build();
        let (engine, store, clock) = engine_with(vec![claim.clone()]).await;
        clock.advance(Duration::hours(2));

        let decided = engine
            .decide(
                &SessionFixtures::reviewer(),
                claim.id,
                "approve",
                Some("Documents verified".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(decided.status, ClaimStatus::Approved);
        assert_eq!(decided.version, 1);
        assert_eq!(decided.history.len(), 1);
        let entry = decided.history.last().unwrap();
        assert_eq!(entry.reviewer_id.as_str(), "priya");
        assert_eq!(entry.reviewer_role, Role::Reviewer);
        assert_eq!(entry.verdict, Verdict::Approve);
        assert_eq!(entry.note.as_deref(), Some("Documents verified"));
        assert_eq!(entry.decided_at, TemporalFixtures::now() + Duration::hours(2));

        assert_eq!(store.get(claim.id).await.unwrap().unwrap(), decided);
    }

    #[tokio::test]
    async fn test_admin_rejects_pending_claim() {
        let claim = TestClaimBuilder::new().build();
        let (engine, _, _) = engine_with(vec![claim.clone()]).await;

        let decided = engine
            .decide(&SessionFixtures::admin(), claim.id, "reject", Some("   ".to_string()))
            .await
            .unwrap();

        assert_eq!(decided.status, ClaimStatus::Rejected);
        assert_eq!(decided.history.last().unwrap().reviewer_role, Role::Admin);
        // blank notes are dropped
        assert_eq!(decided.history.last().unwrap().note, None);
    }

    #[tokio::test]
    async fn test_claimer_cannot_decide() {
        let claim = TestClaimBuilder::new().build();
        let (engine, store, _) = engine_with(vec![claim.clone()]).await;

        let err = engine
            .decide(&SessionFixtures::claimer(), claim.id, "approve", None)
            .await
            .unwrap_err();

        assert_forbidden(&err, Role::Claimer);
        assert_eq!(store.get(claim.id).await.unwrap().unwrap(), claim);
    }

    #[tokio::test]
    async fn test_second_decision_is_invalid_transition() {
        let claim = TestClaimBuilder::new().build();
        let (engine, store, _) = engine_with(vec![claim.clone()]).await;
        let reviewer = SessionFixtures::reviewer();

        engine.decide(&reviewer, claim.id, "approve", None).await.unwrap();
        let err = engine
            .decide(&SessionFixtures::admin(), claim.id, "reject", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::InvalidTransition { current: ClaimStatus::Approved, .. }
        ));
        let stored = store.get(claim.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ClaimStatus::Approved);
        assert_eq!(stored.history.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_decision() {
        let claim = TestClaimBuilder::new().build();
        let (engine, store, _) = engine_with(vec![claim.clone()]).await;

        let err = engine
            .decide(&SessionFixtures::reviewer(), claim.id, "escalate", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidDecision(ref d) if d == "escalate"));
        assert_eq!(store.get(claim.id).await.unwrap().unwrap(), claim);
    }

    #[tokio::test]
    async fn test_unknown_claim() {
        let (engine, _, _) = engine_with(vec![]).await;
        let missing = ClaimId::new_v7();

        let err = engine
            .decide(&SessionFixtures::reviewer(), missing, "approve", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_store_failure_leaves_claim_unchanged() {
        let claim = TestClaimBuilder::new().build();
        let (engine, store, _) = engine_with(vec![claim.clone()]).await;
        store.set_unavailable(true);

        let err = engine
            .decide(&SessionFixtures::reviewer(), claim.id, "approve", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::StoreFailure(_)));

        store.set_unavailable(false);
        let stored = store.get(claim.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ClaimStatus::Pending);
        assert!(stored.history.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decisions_only_one_wins() {
        for _ in 0..20 {
            let claim = TestClaimBuilder::new().build();
            let (engine, store, _) = engine_with(vec![claim.clone()]).await;
            let engine = Arc::new(engine);
            let claim_id = claim.id;

            let approve = {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .decide(&SessionFixtures::reviewer(), claim_id, "approve", None)
                        .await
                })
            };
            let reject = {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .decide(&SessionFixtures::admin(), claim_id, "reject", None)
                        .await
                })
            };

            let results = [approve.await.unwrap(), reject.await.unwrap()];
            let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1);
            assert!(results.iter().any(|r| matches!(r, Err(ClaimError::InvalidTransition { .. }))));

            let stored = store.get(claim_id).await.unwrap().unwrap();
            assert_eq!(stored.history.len(), 1);
            assert_eq!(stored.status, winners[0].status);
        }
    }
}

// ============================================================================
// Deferred scoring
// ============================================================================

mod attach_scores_tests {
    use super::*;

    #[tokio::test]
    async fn test_attach_scores_once() {
        let claim = TestClaimBuilder::new().awaiting_score().build();
        let (engine, _, _) = engine_with(vec![claim.clone()]).await;

        let scored = engine.attach_scores(claim.id, 0.4, 0.82).await.unwrap();
        assert_eq!(scored.scoring, ScoringState::Scored);
        assert_eq!(scored.fraud_score.value(), 0.82);

        let err = engine.attach_scores(claim.id, 0.1, 0.1).await.unwrap_err();
        assert!(matches!(err, ClaimError::Validation(_)));
    }

    #[tokio::test]
    async fn test_attach_out_of_range_score() {
        let claim = TestClaimBuilder::new().awaiting_score().build();
        let (engine, _, _) = engine_with(vec![claim.clone()]).await;

        assert!(matches!(
            engine.attach_scores(claim.id, 0.4, 1.5).await,
            Err(ClaimError::Validation(_))
        ));
    }
}

// ============================================================================
// Reads
// ============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_review_queue_applies_threshold_and_limit() {
        let claims = vec![
            TestClaimBuilder::new().with_fraud(0.75).submitted_minutes_ago(30).build(),
            TestClaimBuilder::new().with_fraud(0.58).submitted_minutes_ago(20).build(),
            TestClaimBuilder::new().with_fraud(0.82).submitted_minutes_ago(10).build(),
        ];
        let (engine, _, _) = engine_with(claims).await;
        let reviewer = SessionFixtures::reviewer();

        let queue = engine.review_queue(&reviewer, None, None).await.unwrap();
        let scores: Vec<f64> = queue.iter().map(|e| e.fraud_score.value()).collect();
        assert_eq!(scores, vec![0.82, 0.75]);

        let top = engine.review_queue(&reviewer, Some(0.5), Some(1)).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].fraud_score.value(), 0.82);
    }

    #[tokio::test]
    async fn test_review_queue_rejects_bad_inputs() {
        let (engine, _, _) = engine_with(vec![]).await;
        let reviewer = SessionFixtures::reviewer();

        assert!(matches!(
            engine.review_queue(&reviewer, Some(1.2), None).await,
            Err(ClaimError::InvalidThreshold(_))
        ));
        assert!(matches!(
            engine.review_queue(&reviewer, None, Some(0)).await,
            Err(ClaimError::Validation(_))
        ));
        assert!(matches!(
            engine.review_queue(&reviewer, None, Some(201)).await,
            Err(ClaimError::Validation(_))
        ));

        let err = engine
            .review_queue(&SessionFixtures::claimer(), None, None)
            .await
            .unwrap_err();
        assert_forbidden(&err, Role::Claimer);
    }

    #[tokio::test]
    async fn test_claimer_sees_only_own_claims() {
        let mine = TestClaimBuilder::new().with_claimant("john").build();
        let theirs = TestClaimBuilder::new().with_claimant("rita").build();
        let (engine, _, _) = engine_with(vec![mine.clone(), theirs.clone()]).await;
        let claimer = SessionFixtures::claimer();

        let listed = engine.list_claims(&claimer).await.unwrap();
        assert_eq!(listed, vec![mine.clone()]);

        assert_eq!(engine.get_claim(&claimer, mine.id).await.unwrap(), mine);
        assert!(matches!(
            engine.get_claim(&claimer, theirs.id).await,
            Err(ClaimError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reviewer_lists_everything_newest_first() {
        let older = TestClaimBuilder::new().submitted_minutes_ago(60).build();
        let newer = TestClaimBuilder::new().with_claimant("rita").submitted_minutes_ago(5).build();
        let (engine, _, _) = engine_with(vec![older.clone(), newer.clone()]).await;

        let listed = engine.list_claims(&SessionFixtures::reviewer()).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_statistics_admin_only() {
        let claims = vec![
            TestClaimBuilder::new().with_fraud(0.75).build(),
            TestClaimBuilder::new().with_fraud(0.2).with_type(ClaimType::Motor).build(),
            TestClaimBuilder::new().with_status(ClaimStatus::Approved).build(),
            TestClaimBuilder::new().with_status(ClaimStatus::Rejected).awaiting_score().build(),
        ];
        let (engine, _, _) = engine_with(claims).await;

        let stats = engine.statistics(&SessionFixtures::admin()).await.unwrap();
        assert_eq!(stats.total_claims, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.flagged_for_review, 1);
        assert_eq!(stats.cleared, 1);
        assert_eq!(stats.awaiting_score, 1);
        assert_eq!(stats.by_type[&ClaimType::Motor], 1);
        assert_eq!(stats.by_type[&ClaimType::Health], 3);
        assert_eq!(stats.total_claimed[&Currency::INR], dec!(480000));
        assert_eq!(stats.approval_rate(), Some(dec!(50.0)));

        let err = engine
            .statistics(&SessionFixtures::reviewer())
            .await
            .unwrap_err();
        assert_forbidden(&err, Role::Reviewer);
    }

    #[tokio::test]
    async fn test_statistics_survive_overflowing_totals() {
        let claims = vec![
            TestClaimBuilder::new().with_amount(Decimal::MAX, Currency::INR).build(),
            TestClaimBuilder::new().with_amount(Decimal::MAX, Currency::INR).build(),
        ];
        let (engine, _, _) = engine_with(claims).await;

        let stats = engine.statistics(&SessionFixtures::admin()).await.unwrap();
        assert_eq!(stats.total_claims, 2);
        assert_eq!(stats.total_claimed[&Currency::INR], Decimal::MAX);
    }
}
