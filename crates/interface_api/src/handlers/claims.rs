//! Claims handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain_access::{authorize, Requirement};
use validator::Validate;

use crate::auth::CurrentSession;
use crate::dto::claims::*;
use crate::handlers::parse_claim_id;
use crate::{error::ApiError, AppState};

/// Submits a new claim (claimers only)
pub async fn submit_claim(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let claim = state.lifecycle.submit(&session, request.into()).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists the claims visible to the caller, newest first
pub async fn list_claims(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ClaimListResponse>, ApiError> {
    let claims = state.lifecycle.list_claims(&session).await?;
    Ok(Json(claims.into()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    let claim = state.lifecycle.get_claim(&session, claim_id).await?;
    Ok(Json(claim.into()))
}

/// Records an approve/reject decision (reviewers and admins)
pub async fn decide_claim(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    authorize(Some(&session), Requirement::REVIEWER_OR_ADMIN)?;
    request.validate()?;
    let claim_id = parse_claim_id(&id)?;
    let claim = state
        .lifecycle
        .decide(&session, claim_id, &request.decision, request.note)
        .await?;
    Ok(Json(claim.into()))
}
