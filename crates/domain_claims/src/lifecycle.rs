//! Claim lifecycle engine
//!
//! Application service behind every claims operation. Each call takes the
//! caller's verified [`Session`] explicitly and runs the access guard before
//! touching claim state.
//!
//! Writes go through [`ClaimStore::save`] with the version that was read.
//! When two writers race on one claim the loser's save reports a conflict;
//! the engine reloads and re-checks, so a second decision on the same claim
//! observes the first one's status and fails with `InvalidTransition`.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use core_kernel::{Clock, ClaimId, Currency, Money, SystemClock};
use domain_access::{authorize, Requirement, Role, Session};

use crate::claim::{Claim, ClaimType, Decision, DocumentRef, ScoreCard, Verdict};
use crate::error::ClaimError;
use crate::ports::{ClaimStore, FraudScorer};
use crate::stats::ClaimStatistics;
use crate::triage::{self, ReviewQueueEntry, Threshold};

/// Store writes attempted before a persistent conflict is reported
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Tunables for triage and submission
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Threshold used when the caller does not supply one
    pub default_threshold: Threshold,
    /// Scores given to a claim the scorer could not rate
    pub unscored: ScoreCard,
    /// Queue length when the caller does not supply a limit
    pub default_queue_limit: usize,
    /// Largest queue length a caller may request
    pub max_queue_limit: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_threshold: Threshold::DEFAULT,
            unscored: ScoreCard::zero(),
            default_queue_limit: 50,
            max_queue_limit: 200,
        }
    }
}

/// Submission payload, as received from the claimer portal
#[derive(Debug, Clone)]
pub struct SubmitClaim {
    pub claim_type: String,
    pub fields: BTreeMap<String, String>,
    pub documents: Vec<String>,
    pub amount: Decimal,
    pub currency: Currency,
}

pub struct ClaimLifecycle {
    store: Arc<dyn ClaimStore>,
    scorer: Option<Arc<dyn FraudScorer>>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl ClaimLifecycle {
    pub fn new(store: Arc<dyn ClaimStore>, config: LifecycleConfig) -> Self {
        Self {
            store,
            scorer: None,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn FraudScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Files a new claim on behalf of a claimer
    ///
    /// Scores come from the configured scorer. Without one, or when it fails,
    /// the claim gets `config.unscored` and stays `AwaitingScore` until
    /// [`attach_scores`](Self::attach_scores) is called.
    ///
    /// # Errors
    ///
    /// * `Access` unless the session is a claimer
    /// * `Validation` for an unknown claim type, no documents, or an amount
    ///   outside `(0, Money::MAX_AMOUNT]`
    /// * `StoreFailure` if the claim could not be stored
    pub async fn submit(&self, session: &Session, request: SubmitClaim) -> Result<Claim, ClaimError> {
        authorize(Some(session), Role::Claimer)?;

        let claim_type: ClaimType = request.claim_type.parse()?;
        let documents = normalize_documents(request.documents)?;
        let amount = Money::positive(request.amount, request.currency)
            .map_err(|e| ClaimError::validation(e.to_string()))?;
        let fields = normalize_fields(request.fields)?;

        let mut claim = Claim::submitted(
            claim_type,
            session.subject_id.clone(),
            amount,
            fields,
            documents,
            self.config.unscored,
            self.clock.now(),
        );

        if let Some(scorer) = &self.scorer {
            match scorer.score(&claim).await {
                Ok(card) => claim = claim.with_scores(card, claim.created_at)?,
                Err(e) => warn!(
                    claim_id = %claim.id,
                    error = %e,
                    "Scorer unavailable, claim left awaiting score"
                ),
            }
        }

        self.store.insert(&claim).await?;

        info!(
            claim_id = %claim.id,
            claimant = %claim.claimant_id,
            claim_type = %claim.claim_type,
            fraud_score = %claim.fraud_score,
            scoring = claim.scoring.as_str(),
            "Claim submitted"
        );
        Ok(claim)
    }

    /// Records a reviewer or admin decision on a pending claim
    ///
    /// Steps, in order: load, authorize, check the claim is pending, parse the
    /// decision, then write. Nothing is visible unless the write succeeds.
    ///
    /// # Errors
    ///
    /// * `NotFound` if no such claim exists
    /// * `Access` unless the session is a reviewer or admin
    /// * `InvalidTransition` if the claim is no longer pending
    /// * `InvalidDecision` unless `decision` is `approve` or `reject`
    /// * `StoreFailure` if the write failed; the claim is unchanged
    pub async fn decide(
        &self,
        session: &Session,
        claim_id: ClaimId,
        decision: &str,
        note: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(claim_id).await?;
        authorize(Some(session), Requirement::REVIEWER_OR_ADMIN)?;

        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let saved = self
            .update_with_retry(claim, |current| {
                if !current.is_pending() {
                    return Err(ClaimError::InvalidTransition {
                        claim_id: current.id,
                        current: current.status,
                    });
                }
                let verdict: Verdict = decision.parse()?;
                current.decide(Decision {
                    reviewer_id: session.subject_id.clone(),
                    reviewer_role: session.role,
                    verdict,
                    note: note.clone(),
                    decided_at: self.clock.now(),
                })
            })
            .await
            .inspect_err(|e| {
                warn!(claim_id = %claim_id, reviewer = %session.subject_id, error = %e, "Decision refused")
            })?;

        info!(
            claim_id = %saved.id,
            reviewer = %session.subject_id,
            role = %session.role,
            status = %saved.status,
            "Claim decided"
        );
        Ok(saved)
    }

    /// Scorer callback for claims submitted while scoring was unavailable
    ///
    /// # Errors
    ///
    /// * `NotFound` if no such claim exists
    /// * `Validation` if the claim is already scored or a score is out of range
    pub async fn attach_scores(&self, claim_id: ClaimId, risk: f64, fraud: f64) -> Result<Claim, ClaimError> {
        let card = ScoreCard::new(risk, fraud)?;
        let claim = self.load(claim_id).await?;
        let saved = self
            .update_with_retry(claim, |current| current.with_scores(card, self.clock.now()))
            .await?;

        info!(claim_id = %saved.id, fraud_score = %saved.fraud_score, "Scores attached");
        Ok(saved)
    }

    /// Manual-review queue for reviewers and admins
    ///
    /// # Errors
    ///
    /// * `Access` unless the session is a reviewer or admin
    /// * `InvalidThreshold` outside `[0, 1]`
    /// * `Validation` if `limit` is zero or above the configured maximum
    pub async fn review_queue(
        &self,
        session: &Session,
        threshold: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<ReviewQueueEntry>, ClaimError> {
        authorize(Some(session), Requirement::REVIEWER_OR_ADMIN)?;

        let threshold = match threshold {
            Some(value) => Threshold::new(value)?,
            None => self.config.default_threshold,
        };
        let limit = limit.unwrap_or(self.config.default_queue_limit);
        if limit == 0 || limit > self.config.max_queue_limit {
            return Err(ClaimError::validation(format!(
                "limit must be between 1 and {}",
                self.config.max_queue_limit
            )));
        }

        let pending = self.store.list_pending().await?;
        let mut entries = triage::queue_with(&pending, threshold);
        entries.truncate(limit);
        Ok(entries)
    }

    /// Fetches one claim
    ///
    /// Claimers may only see their own claims; anyone else's is reported as
    /// `NotFound` so existence is not disclosed.
    pub async fn get_claim(&self, session: &Session, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        authorize(Some(session), Requirement::Authenticated)?;
        let claim = self.load(claim_id).await?;

        if session.role == Role::Claimer && !claim.is_owned_by(&session.subject_id) {
            return Err(ClaimError::NotFound(claim_id));
        }
        Ok(claim)
    }

    /// Lists claims visible to the caller, newest first
    pub async fn list_claims(&self, session: &Session) -> Result<Vec<Claim>, ClaimError> {
        authorize(Some(session), Requirement::Authenticated)?;

        let mut claims = match session.role {
            Role::Claimer => self.store.list_by_claimant(&session.subject_id).await?,
            Role::Reviewer | Role::Admin => self.store.list_all().await?,
        };
        claims.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(claims)
    }

    /// Portfolio statistics for the admin dashboard
    pub async fn statistics(&self, session: &Session) -> Result<ClaimStatistics, ClaimError> {
        authorize(Some(session), Role::Admin)?;
        let claims = self.store.list_all().await?;
        Ok(ClaimStatistics::compute(&claims, self.config.default_threshold))
    }

    async fn load(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.store
            .get(claim_id)
            .await?
            .ok_or(ClaimError::NotFound(claim_id))
    }

    /// Applies `change` and saves, reloading and retrying on version conflicts
    async fn update_with_retry<F>(&self, mut current: Claim, mut change: F) -> Result<Claim, ClaimError>
    where
        F: FnMut(&Claim) -> Result<Claim, ClaimError>,
    {
        let mut attempt = 1;
        loop {
            let next = change(&current)?;
            match self.store.save(&next, current.version).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(claim_id = %current.id, attempt, "Concurrent update detected, reloading");
                    current = self.load(current.id).await?;
                    attempt += 1;
                }
                Err(e) => return Err(ClaimError::StoreFailure(e)),
            }
        }
    }
}

fn normalize_documents(documents: Vec<String>) -> Result<Vec<DocumentRef>, ClaimError> {
    let mut refs: Vec<DocumentRef> = Vec::with_capacity(documents.len());
    for raw in documents {
        let doc = DocumentRef::new(raw)?;
        if !refs.contains(&doc) {
            refs.push(doc);
        }
    }
    if refs.is_empty() {
        return Err(ClaimError::validation(
            "at least one supporting document is required",
        ));
    }
    Ok(refs)
}

fn normalize_fields(fields: BTreeMap<String, String>) -> Result<BTreeMap<String, String>, ClaimError> {
    fields
        .into_iter()
        .map(|(name, value)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ClaimError::validation("field names must not be blank"));
            }
            Ok((name, value.trim().to_string()))
        })
        .collect()
}

impl std::fmt::Debug for ClaimLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimLifecycle")
            .field("config", &self.config)
            .field("scorer", &self.scorer.is_some())
            .finish_non_exhaustive()
    }
}
