//! Access domain errors

use thiserror::Error;

use crate::session::Role;

/// Why a presented token was refused
///
/// Carries no token material, only the category of failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTokenReason {
    #[error("no bearer token presented")]
    Missing,

    #[error("token is malformed")]
    Malformed,

    #[error("token integrity check failed")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token carries unrecognised role '{0}'")]
    UnknownRole(String),
}

/// Errors raised while verifying sessions and authorizing operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Invalid token: {0}")]
    InvalidToken(InvalidTokenReason),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: role '{actual}' may not perform this operation (requires {})", join_roles(.required))]
    Forbidden { actual: Role, required: Vec<Role> },

    #[error("Token issuance failed: {0}")]
    Issuance(String),
}

impl AccessError {
    /// True for failures that mean "who are you?" rather than "not allowed"
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AccessError::InvalidToken(_) | AccessError::Unauthenticated)
    }
}

impl From<InvalidTokenReason> for AccessError {
    fn from(reason: InvalidTokenReason) -> Self {
        AccessError::InvalidToken(reason)
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_names_both_roles() {
        let error = AccessError::Forbidden {
            actual: Role::Claimer,
            required: vec![Role::Reviewer, Role::Admin],
        };
        let message = error.to_string();
        assert!(message.contains("'claimer'"));
        assert!(message.contains("reviewer or admin"));
    }

    #[test]
    fn test_authentication_failures() {
        assert!(AccessError::Unauthenticated.is_authentication_failure());
        assert!(AccessError::from(InvalidTokenReason::Expired).is_authentication_failure());
        assert!(!AccessError::Forbidden {
            actual: Role::Claimer,
            required: vec![Role::Admin],
        }
        .is_authentication_failure());
    }
}
