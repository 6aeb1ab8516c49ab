//! Custom Test Assertions

use domain_access::{AccessError, Role};
use domain_claims::{ClaimError, ReviewQueueEntry};

/// Asserts that queue entries are in review priority order
///
/// Fraud score descending, then submission time ascending, then claim id.
pub fn assert_review_ordered(entries: &[ReviewQueueEntry]) {
    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.fraud_score > b.fraud_score
            || (a.fraud_score == b.fraud_score && a.created_at < b.created_at)
            || (a.fraud_score == b.fraud_score
                && a.created_at == b.created_at
                && a.claim_id < b.claim_id);
        assert!(
            ordered,
            "Queue out of order: {} (fraud {}, {}) before {} (fraud {}, {})",
            a.claim_id, a.fraud_score, a.created_at, b.claim_id, b.fraud_score, b.created_at
        );
    }
}

/// Asserts that every entry is at or above `threshold`
pub fn assert_all_flagged(entries: &[ReviewQueueEntry], threshold: f64) {
    for entry in entries {
        assert!(
            entry.fraud_score.value() >= threshold,
            "Claim {} has fraud score {} below threshold {}",
            entry.claim_id,
            entry.fraud_score,
            threshold
        );
    }
}

/// Asserts that `err` is a Forbidden access error for the given actual role
pub fn assert_forbidden(err: &ClaimError, actual_role: Role) {
    match err {
        ClaimError::Access(AccessError::Forbidden { actual, .. }) => {
            assert_eq!(*actual, actual_role, "Forbidden for unexpected role");
        }
        other => panic!("Expected Forbidden for {actual_role}, got {other:?}"),
    }
}

/// Asserts that `err` reports a missing session
pub fn assert_unauthenticated(err: &ClaimError) {
    assert!(
        matches!(err, ClaimError::Access(AccessError::Unauthenticated)),
        "Expected Unauthenticated, got {err:?}"
    );
}
