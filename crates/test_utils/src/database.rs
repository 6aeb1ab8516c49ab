//! PostgreSQL containers for claim store adapter tests
//!
//! Each [`TestDatabase`] owns a throwaway `postgres:16-alpine` container, so
//! tests never share rows. Schema setup is left to the caller:
//!
//! ```rust,ignore
//! let db = TestDatabase::start().await?;
//! infra_db::run_migrations(db.pool()).await?;
//! ```

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::{ContainerAsync, ImageExt};

const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "claims_test";
const POSTGRES_PASSWORD: &str = "claims_test";
const POSTGRES_DB: &str = "claims_test";

pub type TestDatabaseError = Box<dyn std::error::Error + Send + Sync>;

/// A running PostgreSQL container and a pool connected to it
///
/// The container stops when this value is dropped.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
}

impl TestDatabase {
    /// Starts a fresh container and waits until it accepts connections
    pub async fn start() -> Result<Self, TestDatabaseError> {
        let container = Postgres::default()
            .with_user(POSTGRES_USER)
            .with_password(POSTGRES_PASSWORD)
            .with_db_name(POSTGRES_DB)
            .with_tag(POSTGRES_TAG)
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let url = format!("postgres://{POSTGRES_USER}:{POSTGRES_PASSWORD}@{host}:{port}/{POSTGRES_DB}");

        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
