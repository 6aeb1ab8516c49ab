//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims triage test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pinned instants, sessions per role, signed tokens, scorer doubles
//! - `builders`: Builder for claims in any state
//! - `assertions`: Assertion helpers for queue ordering and access failures
//! - `generators`: Property-based test data generators
//! - `database`: Throwaway PostgreSQL containers for adapter tests

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod database;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use database::{TestDatabase, TestDatabaseError};
