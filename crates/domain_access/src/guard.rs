//! Role-based authorization
//!
//! [`authorize`] is a pure decision over an already-verified session. It does
//! not parse tokens, perform I/O, or retry; a denial is final for the request.

use crate::error::AccessError;
use crate::session::{Role, Session};

/// What an operation demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid session
    Authenticated,
    /// Exactly this role
    Role(Role),
    /// Any one of these roles
    AnyOf(&'static [Role]),
}

impl Requirement {
    /// Decision-making operations: reviewers and admins
    pub const REVIEWER_OR_ADMIN: Requirement = Requirement::AnyOf(&[Role::Reviewer, Role::Admin]);

    /// Roles that satisfy this requirement
    pub fn roles(&self) -> Vec<Role> {
        match self {
            Requirement::Authenticated => Role::ALL.to_vec(),
            Requirement::Role(role) => vec![*role],
            Requirement::AnyOf(roles) => roles.to_vec(),
        }
    }

    pub fn is_satisfied_by(&self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Role(required) => *required == role,
            Requirement::AnyOf(roles) => roles.contains(&role),
        }
    }
}

impl From<Role> for Requirement {
    fn from(role: Role) -> Self {
        Requirement::Role(role)
    }
}

impl From<Option<Role>> for Requirement {
    fn from(role: Option<Role>) -> Self {
        role.map_or(Requirement::Authenticated, Requirement::Role)
    }
}

/// Decides whether `session` may perform an operation guarded by `requirement`
///
/// # Errors
///
/// * `AccessError::Unauthenticated` when there is no session
/// * `AccessError::Forbidden` when the session's role does not satisfy the
///   requirement; the error names the actual and the accepted roles
pub fn authorize(
    session: Option<&Session>,
    requirement: impl Into<Requirement>,
) -> Result<(), AccessError> {
    let session = session.ok_or(AccessError::Unauthenticated)?;
    let requirement = requirement.into();

    if requirement.is_satisfied_by(session.role) {
        Ok(())
    } else {
        Err(AccessError::Forbidden {
            actual: session.role,
            required: requirement.roles(),
        })
    }
}
