//! Session extraction for handlers
//!
//! [`crate::middleware::auth_middleware`] verifies the bearer token and
//! stores the resulting [`Session`] in the request extensions. Handlers take
//! it back out with the [`CurrentSession`] extractor and pass it explicitly to
//! every lifecycle call.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use domain_access::{AccessError, Session};

use crate::error::ApiError;

/// The verified session of the caller
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AccessError::Unauthenticated.into())
    }
}
