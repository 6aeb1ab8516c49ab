//! Core Kernel - Foundational types for the claims triage platform
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for claims and subjects
//! - Money with precise decimal arithmetic
//! - A `Clock` abstraction so time-dependent logic stays testable
//! - Port error types for adapters (databases, scorers)

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, SystemClock, ManualClock};
pub use identifiers::{ClaimId, SubjectId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
