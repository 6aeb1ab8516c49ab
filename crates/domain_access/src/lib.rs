//! Access Domain
//!
//! Turns a presented bearer credential into a [`Session`] and decides whether
//! that session may perform an operation.
//!
//! # Request path
//!
//! ```text
//! Authorization: Bearer <jwt> -> SessionVerifier -> Session -> authorize(Requirement)
//! ```
//!
//! Roles are a closed set of three. Tokens carrying any other role are rejected
//! at the verifier, so downstream code never sees an unknown role.

pub mod session;
pub mod token;
pub mod guard;
pub mod error;

pub use session::{Role, Session};
pub use token::{SessionVerifier, TokenIssuer, TokenClaims};
pub use guard::{authorize, Requirement};
pub use error::{AccessError, InvalidTokenReason};
