//! In-memory claim store
//!
//! Keeps claims in a map behind a `tokio::sync::RwLock`. The version check and
//! the write in [`ClaimStore::save`] happen under one write guard, which gives
//! the same per-claim serialization the database adapter gets from its
//! `UPDATE ... WHERE version = $n`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, SubjectId};

use crate::claim::{Claim, ClaimStatus};
use crate::ports::ClaimStore;

const ADAPTER_ID: &str = "in-memory-claim-store";

#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    claims: RwLock<HashMap<ClaimId, Claim>>,
    unavailable: AtomicBool,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, keeping each claim's version as given
    pub async fn with_claims(claims: impl IntoIterator<Item = Claim>) -> Self {
        let store = Self::new();
        {
            let mut map = store.claims.write().await;
            for claim in claims {
                map.insert(claim.id, claim);
            }
        }
        store
    }

    /// Makes every subsequent call fail as if the backend were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PortError::unavailable("in-memory claim store"));
        }
        Ok(())
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        match self.check_available() {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, 0),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, 0, e.to_string()),
        }
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        self.check_available()?;
        Ok(self.claims.read().await.get(&id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<Claim>, PortError> {
        self.check_available()?;
        Ok(self
            .claims
            .read()
            .await
            .values()
            .filter(|c| c.status == ClaimStatus::Pending)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
        self.check_available()?;
        Ok(self.claims.read().await.values().cloned().collect())
    }

    async fn list_by_claimant(&self, claimant: &SubjectId) -> Result<Vec<Claim>, PortError> {
        self.check_available()?;
        Ok(self
            .claims
            .read()
            .await
            .values()
            .filter(|c| c.is_owned_by(claimant))
            .cloned()
            .collect())
    }

    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        self.check_available()?;
        let mut claims = self.claims.write().await;
        if claims.contains_key(&claim.id) {
            return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
        }
        claims.insert(claim.id, claim.clone());
        debug!(claim_id = %claim.id, "Inserted claim");
        Ok(())
    }

    async fn save(&self, claim: &Claim, expected_version: u64) -> Result<Claim, PortError> {
        self.check_available()?;
        let mut claims = self.claims.write().await;
        let current = claims
            .get(&claim.id)
            .ok_or_else(|| PortError::not_found("Claim", claim.id))?;

        if current.version != expected_version {
            return Err(PortError::conflict(format!(
                "claim {} is at version {}, expected {}",
                claim.id, current.version, expected_version
            )));
        }
        if !claim.history.extends(&current.history) {
            return Err(PortError::conflict(format!(
                "decision history of claim {} must be append-only",
                claim.id
            )));
        }

        let mut stored = claim.clone();
        stored.version = expected_version + 1;
        claims.insert(stored.id, stored.clone());
        debug!(claim_id = %stored.id, version = stored.version, "Saved claim");
        Ok(stored)
    }
}
