//! Request handlers
//!
//! Handlers translate HTTP into lifecycle calls. The lifecycle engine
//! authorizes every operation against the session. Handlers that address a
//! claim by id for a privileged action guard first as well, so a caller
//! without the role cannot tell a missing claim from an existing one.

pub mod claims;
pub mod review;
pub mod session;
pub mod admin;
pub mod health;

use core_kernel::ClaimId;

use crate::error::ApiError;

/// Parses a claim id path segment, with or without the `CLM-` prefix
pub(crate) fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{raw}' is not a valid claim id")))
}
