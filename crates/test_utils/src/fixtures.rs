//! Pre-built Test Fixtures
//!
//! Sessions, tokens and instants that are stable across runs, so assertions
//! on timestamps and ordering stay deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use core_kernel::{DomainPort, ManualClock, PortError, SubjectId};
use domain_access::{Role, Session, SessionVerifier, TokenIssuer};
use domain_claims::{Claim, FraudScorer, ScoreCard};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reference instant all fixtures are anchored to (Feb 15, 2024 10:00 UTC)
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap()
    }

    /// `minutes` before the reference instant
    pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Self::now() - Duration::minutes(minutes)
    }

    /// A manual clock starting at the reference instant
    pub fn clock() -> ManualClock {
        ManualClock::new(Self::now())
    }
}

/// Fixture for sessions of each role
pub struct SessionFixtures;

impl SessionFixtures {
    pub fn session(subject: &str, role: Role) -> Session {
        let issued = TemporalFixtures::now() - Duration::minutes(5);
        Session::new(
            SubjectId::new(subject).unwrap(),
            format!("{subject}@email.com"),
            role,
            issued,
            issued + Duration::hours(1),
        )
    }

    pub fn claimer() -> Session {
        Self::session("john", Role::Claimer)
    }

    pub fn other_claimer() -> Session {
        Self::session("rita", Role::Claimer)
    }

    pub fn reviewer() -> Session {
        Self::session("priya", Role::Reviewer)
    }

    pub fn admin() -> Session {
        Self::session("root", Role::Admin)
    }
}

/// Shared signing secret for token round-trips in tests
pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

/// Fixture for signed tokens
pub struct TokenFixtures;

impl TokenFixtures {
    pub fn issuer(clock: &ManualClock) -> TokenIssuer {
        TokenIssuer::new(TEST_JWT_SECRET.as_bytes(), Duration::hours(1), Arc::new(clock.clone()))
    }

    pub fn verifier(clock: &ManualClock) -> SessionVerifier {
        SessionVerifier::new(TEST_JWT_SECRET.as_bytes(), Arc::new(clock.clone()))
    }

    /// Token for `subject` with `role`, valid for an hour from the clock's now
    pub fn token(clock: &ManualClock, subject: &str, role: Role) -> String {
        Self::issuer(clock)
            .issue(&SubjectId::new(subject).unwrap(), &format!("{subject}@email.com"), role)
            .unwrap()
    }
}

/// Scorer double that always returns the same card and counts calls
#[derive(Debug)]
pub struct StaticScorer {
    card: ScoreCard,
    calls: AtomicUsize,
}

impl StaticScorer {
    pub fn new(risk: f64, fraud: f64) -> Self {
        Self {
            card: ScoreCard::new(risk, fraud).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for StaticScorer {}

#[async_trait]
impl FraudScorer for StaticScorer {
    async fn score(&self, _claim: &Claim) -> Result<ScoreCard, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.card)
    }
}

/// Scorer double that is always down
#[derive(Debug, Default)]
pub struct UnavailableScorer;

impl DomainPort for UnavailableScorer {}

#[async_trait]
impl FraudScorer for UnavailableScorer {
    async fn score(&self, _claim: &Claim) -> Result<ScoreCard, PortError> {
        Err(PortError::unavailable("fraud-scorer"))
    }
}
