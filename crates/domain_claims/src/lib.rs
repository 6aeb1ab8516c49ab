//! Claims Domain
//!
//! This crate implements claim intake, fraud triage, and the review lifecycle.
//!
//! # Claim Lifecycle
//!
//! ```text
//! submit -> Pending -> decide(approve) -> Approved
//!                   \-> decide(reject)  -> Rejected
//! ```
//!
//! Decisions are one-shot: `Approved` and `Rejected` are terminal. Every
//! decision is appended to the claim's history, which is never rewritten.
//!
//! # Triage
//!
//! The review queue is derived on every read from pending claims whose fraud
//! score meets a caller-supplied threshold. See [`triage::queue`].

pub mod claim;
pub mod error;
pub mod ports;
pub mod memory;
pub mod triage;
pub mod lifecycle;
pub mod stats;

pub use claim::{
    Claim, ClaimStatus, ClaimType, Decision, DecisionHistory, DocumentRef, Score, ScoreCard,
    ScoringState, Verdict,
};
pub use error::ClaimError;
pub use ports::{ClaimStore, FraudScorer};
pub use memory::InMemoryClaimStore;
pub use triage::{queue, ReviewQueueEntry, RiskLevel, Threshold};
pub use lifecycle::{ClaimLifecycle, LifecycleConfig, SubmitClaim};
pub use stats::ClaimStatistics;
