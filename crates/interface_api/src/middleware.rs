//! Request middleware for `/api/v1`
//!
//! Layer order, outermost first: audit, then authentication. Audit therefore
//! sees rejected requests too; it learns who the caller was from the
//! [`Session`] that authentication copies onto the response.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use domain_access::Session;

use crate::error::ApiError;
use crate::AppState;

/// Verifies the bearer token and puts the [`Session`] in the request extensions
///
/// Requests without a valid token are answered with 401 here and never reach
/// a handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let session = state.verifier.verify_authorization_header(header)?;
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(session);
    Ok(response)
}

/// Logs one line per API request: caller, route, outcome and latency
///
/// Never logs the token.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let (subject, role) = response
        .extensions()
        .get::<Session>()
        .map(|s| (s.subject_id.to_string(), s.role.as_str()))
        .unwrap_or_else(|| ("anonymous".to_string(), "none"));

    info!(
        method = %method,
        uri = %uri,
        subject = %subject,
        role = role,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
