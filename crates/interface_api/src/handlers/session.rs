//! Session introspection

use axum::Json;

use crate::auth::CurrentSession;
use crate::dto::session::SessionResponse;

/// Returns the caller's verified session
pub async fn me(CurrentSession(session): CurrentSession) -> Json<SessionResponse> {
    Json(session.into())
}
