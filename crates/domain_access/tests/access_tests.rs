//! Integration tests for domain_access: verifier and guard working together

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use core_kernel::{ManualClock, SubjectId};
use domain_access::{
    authorize, AccessError, InvalidTokenReason, Requirement, Role, SessionVerifier, TokenIssuer,
};

const SECRET: &[u8] = b"integration-secret";

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 12, 8, 30, 0).unwrap())
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Claimer), Just(Role::Reviewer), Just(Role::Admin)]
}

mod verify_then_authorize {
    use super::*;

    #[test]
    fn test_claimer_token_cannot_reach_reviewer_operations() {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(30), Arc::new(clock.clone()));
        let verifier = SessionVerifier::new(SECRET, Arc::new(clock.clone()));

        let token = issuer
            .issue(&SubjectId::new("john").unwrap(), "claimer@email.com", Role::Claimer)
            .unwrap();
        let session = verifier.verify(&token).unwrap();

        let err = authorize(Some(&session), Requirement::REVIEWER_OR_ADMIN).unwrap_err();
        match err {
            AccessError::Forbidden { actual, required } => {
                assert_eq!(actual, Role::Claimer);
                assert_eq!(required, vec![Role::Reviewer, Role::Admin]);
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn test_forbidden_message_does_not_leak_token() {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(30), Arc::new(clock.clone()));
        let verifier = SessionVerifier::new(SECRET, Arc::new(clock.clone()));

        let token = issuer
            .issue(&SubjectId::new("john").unwrap(), "claimer@email.com", Role::Claimer)
            .unwrap();
        let session = verifier.verify(&token).unwrap();
        let message = authorize(Some(&session), Role::Admin).unwrap_err().to_string();

        assert!(!message.contains(&token));
        assert!(message.contains("claimer"));
        assert!(message.contains("admin"));
    }

    #[test]
    fn test_token_expiring_mid_flow() {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(5), Arc::new(clock.clone()));
        let verifier = SessionVerifier::new(SECRET, Arc::new(clock.clone()));
        let token = issuer
            .issue(&SubjectId::new("rev").unwrap(), "rev@email.com", Role::Reviewer)
            .unwrap();

        assert!(verifier.verify(&token).is_ok());
        clock.advance(Duration::minutes(6));
        assert_eq!(
            verifier.verify(&token).unwrap_err(),
            AccessError::InvalidToken(InvalidTokenReason::Expired)
        );
    }
}

proptest! {
    #[test]
    fn prop_decision_requirement_excludes_only_claimers(role in role_strategy()) {
        let now = Utc::now();
        let session = domain_access::Session::new(
            SubjectId::new("p").unwrap(),
            "p@email.com",
            role,
            now,
            now + Duration::hours(1),
        );
        let allowed = authorize(Some(&session), Requirement::REVIEWER_OR_ADMIN).is_ok();
        prop_assert_eq!(allowed, role != Role::Claimer);
    }

    #[test]
    fn prop_arbitrary_strings_never_verify(token in "\\PC{0,120}") {
        let verifier = SessionVerifier::new(SECRET, Arc::new(clock()));
        let result = verifier.verify(&token);
        prop_assert!(
            matches!(result, Err(AccessError::InvalidToken(_))),
            "unexpected result {:?}", result
        );
    }

    #[test]
    fn prop_round_trip_preserves_role(role in role_strategy(), ttl_mins in 1i64..600) {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, Duration::minutes(ttl_mins), Arc::new(clock.clone()));
        let verifier = SessionVerifier::new(SECRET, Arc::new(clock.clone()));
        let token = issuer.issue(&SubjectId::new("p").unwrap(), "p@email.com", role).unwrap();
        prop_assert_eq!(verifier.verify(&token).unwrap().role, role);
    }
}
