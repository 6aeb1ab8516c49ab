//! Repository implementations for domain aggregates
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! types. They implement the domain's port traits directly.

pub mod claims;

pub use claims::PgClaimStore;
