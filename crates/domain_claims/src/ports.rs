//! Claims Domain Ports
//!
//! The lifecycle engine depends on these traits only. Adapters:
//!
//! - **PostgreSQL**: `infra_db::PgClaimStore`
//! - **In-memory**: [`crate::memory::InMemoryClaimStore`], for tests and local runs
//!
//! ```rust,ignore
//! let store: Arc<dyn ClaimStore> = match config.database_url {
//!     Some(url) => Arc::new(PgClaimStore::new(create_pool_from_url(&url).await?)),
//!     None => Arc::new(InMemoryClaimStore::new()),
//! };
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError, SubjectId};

use crate::claim::{Claim, ScoreCard};

/// Persistence for claim records
///
/// `save` must be an atomic compare-and-swap on `(id, version)`: it replaces
/// the stored claim only if the stored version still equals
/// `expected_version`, otherwise it fails with `PortError::Conflict`. This is
/// what serializes concurrent decisions on one claim. Implementations must
/// also refuse a save whose decision history does not extend the stored one.
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Retrieves a claim by ID, or `None` if absent
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError>;

    /// All claims whose status is `Pending`
    async fn list_pending(&self) -> Result<Vec<Claim>, PortError>;

    /// All claims
    async fn list_all(&self) -> Result<Vec<Claim>, PortError>;

    /// Claims submitted by `claimant`
    async fn list_by_claimant(&self, claimant: &SubjectId) -> Result<Vec<Claim>, PortError>;

    /// Stores a new claim; fails with `Conflict` if the ID is taken
    async fn insert(&self, claim: &Claim) -> Result<(), PortError>;

    /// Replaces a claim if its stored version equals `expected_version`
    ///
    /// # Returns
    ///
    /// The stored claim, carrying the new version
    async fn save(&self, claim: &Claim, expected_version: u64) -> Result<Claim, PortError>;
}

/// External fraud/risk scoring model
#[async_trait]
pub trait FraudScorer: DomainPort {
    /// Scores a freshly submitted claim
    async fn score(&self, claim: &Claim) -> Result<ScoreCard, PortError>;
}
