//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the claims platform using SQLx.
//!
//! # Concurrency
//!
//! Every claim row carries a `version` column. Writes are compare-and-swap on
//! that column, so two reviewers deciding the same claim at once cannot both
//! succeed: the second `UPDATE ... WHERE version = $n` matches no row and the
//! store reports a conflict.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, PgClaimStore};
//!
//! let pool = create_pool_from_url("postgres://localhost/claims").await?;
//! run_migrations(&pool).await?;
//! let store = PgClaimStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::PgClaimStore;
