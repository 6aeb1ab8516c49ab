//! PostgreSQL claim store
//!
//! One row per claim. Form fields, document references and the decision
//! history are JSONB columns; they are only ever read and written whole.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{
    ClaimId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money,
    PortError, SubjectId,
};
use domain_claims::{
    Claim, ClaimStatus, ClaimStore, ClaimType, Decision, DecisionHistory, DocumentRef, Score,
    ScoringState,
};

use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-claim-store";

const CLAIM_COLUMNS: &str = "claim_id, claim_type, claimant_id, amount, currency, fields, \
    documents, risk_score, fraud_score, scoring, status, history, created_at, updated_at, version";

/// Database representation of a claim
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub claim_type: String,
    pub claimant_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub fields: Json<BTreeMap<String, String>>,
    pub documents: Json<Vec<DocumentRef>>,
    pub risk_score: f64,
    pub fraud_score: f64,
    pub scoring: String,
    pub status: String,
    pub history: Json<Vec<Decision>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl ClaimRow {
    /// Flattens a claim for binding
    ///
    /// # Errors
    ///
    /// `SerializationError` if the version does not fit in a `BIGINT`
    pub fn from_claim(claim: &Claim) -> Result<Self, DatabaseError> {
        Ok(Self {
            claim_id: *claim.id.as_uuid(),
            claim_type: claim.claim_type.as_str().to_string(),
            claimant_id: claim.claimant_id.as_str().to_string(),
            amount: claim.amount.amount(),
            currency: claim.amount.currency().code().to_string(),
            fields: Json(claim.fields.clone()),
            documents: Json(claim.documents.clone()),
            risk_score: claim.risk_score.value(),
            fraud_score: claim.fraud_score.value(),
            scoring: claim.scoring.as_str().to_string(),
            status: claim.status.as_str().to_string(),
            history: Json(claim.history.as_slice().to_vec()),
            created_at: claim.created_at,
            updated_at: claim.updated_at,
            version: to_db_version(claim.version)?,
        })
    }

    /// Rebuilds the domain claim
    ///
    /// # Errors
    ///
    /// `SerializationError` if any column holds a value the domain rejects
    pub fn into_claim(self) -> Result<Claim, DatabaseError> {
        let claim_type: ClaimType = self
            .claim_type
            .parse()
            .map_err(|e| DatabaseError::serialization(format!("claim {}: {e}", self.claim_id)))?;
        let status: ClaimStatus = self
            .status
            .parse()
            .map_err(|s| DatabaseError::serialization(format!("unknown claim status '{s}'")))?;
        let scoring: ScoringState = self
            .scoring
            .parse()
            .map_err(|s| DatabaseError::serialization(format!("unknown scoring state '{s}'")))?;
        let claimant_id = SubjectId::new(self.claimant_id)
            .map_err(|e| DatabaseError::serialization(e.to_string()))?;
        let score = |value: f64| {
            Score::new(value).map_err(|e| DatabaseError::serialization(e.to_string()))
        };
        let version = u64::try_from(self.version)
            .map_err(|_| DatabaseError::serialization(format!("negative version {}", self.version)))?;

        Ok(Claim {
            id: ClaimId::from_uuid(self.claim_id),
            claim_type,
            claimant_id,
            amount: Money::new(self.amount, parse_currency(&self.currency)?),
            fields: self.fields.0,
            documents: self.documents.0,
            risk_score: score(self.risk_score)?,
            fraud_score: score(self.fraud_score)?,
            scoring,
            status,
            history: DecisionHistory::from_persisted(self.history.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
            version,
        })
    }
}

fn parse_currency(code: &str) -> Result<Currency, DatabaseError> {
    code.parse::<Currency>()
        .map_err(|e| DatabaseError::serialization(e.to_string()))
}

fn to_db_version(version: u64) -> Result<i64, DatabaseError> {
    i64::try_from(version).map_err(|_| DatabaseError::serialization(format!("version {version} overflows BIGINT")))
}

/// PostgreSQL-backed implementation of [`ClaimStore`]
#[derive(Debug, Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, bind: Option<&str>) -> Result<Vec<Claim>, DatabaseError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims {clause}");
        let mut query = sqlx::query_as::<_, ClaimRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ClaimRow::into_claim)
            .collect()
    }

    async fn compare_and_swap(&self, claim: &Claim, expected_version: u64) -> Result<Claim, DatabaseError> {
        let row = ClaimRow::from_claim(claim)?;
        let expected = to_db_version(expected_version)?;
        let mut tx = self.pool.begin().await?;

        let current: Option<(i64, Json<Vec<Decision>>)> =
            sqlx::query_as("SELECT version, history FROM claims WHERE claim_id = $1 FOR UPDATE")
                .bind(row.claim_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (stored_version, stored_history) =
            current.ok_or_else(|| DatabaseError::not_found("Claim", claim.id))?;

        if stored_version != expected {
            return Err(DatabaseError::StaleVersion(format!(
                "claim {} is at version {stored_version}, expected {expected}",
                claim.id
            )));
        }
        if !claim
            .history
            .extends(&DecisionHistory::from_persisted(stored_history.0))
        {
            return Err(DatabaseError::StaleVersion(format!(
                "claim {} decision history would be rewritten",
                claim.id
            )));
        }

        let sql = format!(
            "UPDATE claims SET \
                risk_score = $3, fraud_score = $4, scoring = $5, status = $6, \
                history = $7, updated_at = $8, version = version + 1 \
             WHERE claim_id = $1 AND version = $2 \
             RETURNING {CLAIM_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(row.claim_id)
            .bind(expected)
            .bind(row.risk_score)
            .bind(row.fraud_score)
            .bind(&row.scoring)
            .bind(&row.status)
            .bind(&row.history)
            .bind(row.updated_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::StaleVersion(format!("claim {} moved on", claim.id)))?;

        tx.commit().await?;
        updated.into_claim()
    }
}

impl DomainPort for PgClaimStore {}

#[async_trait]
impl HealthCheckable for PgClaimStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => {
                warn!(error = %e, "Claim store health check failed");
                HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {e}"))
            }
        }
    }
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.map(ClaimRow::into_claim).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_pending(&self) -> Result<Vec<Claim>, PortError> {
        Ok(self
            .fetch_where(
                "WHERE status = 'pending' ORDER BY fraud_score DESC, created_at, claim_id",
                None,
            )
            .await?)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
        Ok(self.fetch_where("ORDER BY created_at DESC", None).await?)
    }

    #[instrument(skip(self), fields(claimant = %claimant))]
    async fn list_by_claimant(&self, claimant: &SubjectId) -> Result<Vec<Claim>, PortError> {
        Ok(self
            .fetch_where(
                "WHERE claimant_id = $1 ORDER BY created_at DESC",
                Some(claimant.as_str()),
            )
            .await?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        let row = ClaimRow::from_claim(claim)?;
        sqlx::query(
            "INSERT INTO claims (claim_id, claim_type, claimant_id, amount, currency, fields, \
                documents, risk_score, fraud_score, scoring, status, history, created_at, \
                updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(row.claim_id)
        .bind(&row.claim_type)
        .bind(&row.claimant_id)
        .bind(row.amount)
        .bind(&row.currency)
        .bind(&row.fields)
        .bind(&row.documents)
        .bind(row.risk_score)
        .bind(row.fraud_score)
        .bind(&row.scoring)
        .bind(&row.status)
        .bind(&row.history)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.version)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!("Inserted claim");
        Ok(())
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn save(&self, claim: &Claim, expected_version: u64) -> Result<Claim, PortError> {
        self.compare_and_swap(claim, expected_version)
            .await
            .inspect_err(|e| {
                if matches!(e, DatabaseError::StaleVersion(_)) {
                    warn!(error = %e, "Claim write lost a race");
                }
            })
            .map_err(PortError::from)
    }
}
