//! Review queue handler

use axum::{
    extract::{Query, State},
    Json,
};

use crate::auth::CurrentSession;
use crate::dto::review::{ReviewQueueQuery, ReviewQueueResponse};
use crate::{error::ApiError, AppState};

/// Pending claims at or above the fraud threshold, highest risk first
pub async fn review_queue(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<ReviewQueueResponse>, ApiError> {
    let entries = state
        .lifecycle
        .review_queue(&session, query.threshold, query.limit)
        .await?;

    let threshold = query
        .threshold
        .unwrap_or_else(|| state.lifecycle.config().default_threshold.value());
    Ok(Json(ReviewQueueResponse {
        threshold,
        count: entries.len(),
        entries,
    }))
}
