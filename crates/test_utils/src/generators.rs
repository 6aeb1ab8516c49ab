//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating claims snapshots that keep
//! the domain invariants (scores in range, positive amounts, history that
//! matches status).

use chrono::Duration;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::Currency;
use domain_claims::{Claim, ClaimStatus, ClaimType};

use crate::builders::TestClaimBuilder;
use crate::fixtures::TemporalFixtures;

/// Strategy for valid scores, biased toward the interesting edges
pub fn score_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        1 => Just(0.6),
        1 => Just(1.0),
        7 => 0.0f64..=1.0f64,
    ]
}

/// Strategy for valid thresholds
pub fn threshold_strategy() -> impl Strategy<Value = f64> {
    score_strategy()
}

/// Strategy for values outside `[0, 1]`
pub fn out_of_range_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1000.0f64..-0.0001f64,
        1.0001f64..1000.0f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
    ]
}

pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::INR),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
    ]
}

pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![
        Just(ClaimType::Health),
        Just(ClaimType::Motor),
        Just(ClaimType::Property),
    ]
}

pub fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        3 => Just(ClaimStatus::Pending),
        1 => Just(ClaimStatus::Approved),
        1 => Just(ClaimStatus::Rejected),
    ]
}

/// Strategy for positive amounts with two decimal places
pub fn positive_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for a single claim
///
/// Submission times fall within a small window so ties on `created_at` are
/// common and the id tie-break gets exercised.
pub fn claim_strategy() -> impl Strategy<Value = Claim> {
    (
        claim_type_strategy(),
        prop_oneof![Just("john"), Just("rita"), Just("asha")],
        positive_amount_strategy(),
        currency_strategy(),
        score_strategy(),
        score_strategy(),
        status_strategy(),
        0i64..5,
    )
        .prop_map(|(claim_type, claimant, amount, currency, risk, fraud, status, offset)| {
            TestClaimBuilder::new()
                .with_type(claim_type)
                .with_claimant(claimant)
                .with_amount(amount, currency)
                .with_risk(risk)
                .with_fraud(fraud)
                .with_status(status)
                .created_at(TemporalFixtures::now() + Duration::seconds(offset))
                .build()
        })
}

/// Strategy for a snapshot of up to `max` claims
pub fn claims_strategy(max: usize) -> impl Strategy<Value = Vec<Claim>> {
    prop::collection::vec(claim_strategy(), 0..=max)
}
