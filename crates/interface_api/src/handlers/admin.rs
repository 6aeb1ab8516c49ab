//! Admin handlers

use axum::{
    extract::{Path, State},
    Json,
};

use domain_access::{authorize, Role};

use crate::auth::CurrentSession;
use crate::dto::admin::{AttachScoresRequest, StatisticsResponse};
use crate::dto::claims::ClaimResponse;
use crate::handlers::parse_claim_id;
use crate::{error::ApiError, AppState};

/// Portfolio statistics
pub async fn statistics(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = state.lifecycle.statistics(&session).await?;
    Ok(Json(stats.into()))
}

/// Attaches scorer output to a claim that was submitted unscored
///
/// The scorer integration runs with an admin credential.
pub async fn attach_scores(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(request): Json<AttachScoresRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    authorize(Some(&session), Role::Admin)?;
    let claim_id = parse_claim_id(&id)?;
    let claim = state
        .lifecycle
        .attach_scores(claim_id, request.risk_score, request.fraud_score)
        .await?;
    Ok(Json(claim.into()))
}
