//! Claims domain errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError};
use domain_access::AccessError;

use crate::claim::ClaimStatus;

/// Errors that can occur in the claims domain
///
/// Every variant is terminal for the request that raised it. Only
/// `StoreFailure` is worth retrying, and only by replaying the whole request.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Token, authentication, or role failure
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Claim not found: {0}")]
    NotFound(ClaimId),

    #[error("Claim {claim_id} is already {current} and cannot be decided again")]
    InvalidTransition { claim_id: ClaimId, current: ClaimStatus },

    #[error("Invalid decision '{0}': expected 'approve' or 'reject'")]
    InvalidDecision(String),

    #[error("Invalid threshold {0}: must be within [0, 1]")]
    InvalidThreshold(f64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Claim store failure: {0}")]
    StoreFailure(#[source] PortError),
}

impl ClaimError {
    /// True only for store failures; nothing else changes on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClaimError::StoreFailure(_))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }
}

impl From<PortError> for ClaimError {
    fn from(error: PortError) -> Self {
        ClaimError::StoreFailure(error)
    }
}
