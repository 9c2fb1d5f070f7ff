//! Connection pool over the configured relational store.
//!
//! A [`Database`] wraps a `sqlx` [`AnyPool`] so postgres, mysql and sqlite
//! are opened through one code path. Pool checkout, return and recycling are
//! left entirely to `sqlx`; the handle is cheap to clone and shared by every
//! request.

pub mod driver;
pub mod model;
pub mod repository;
pub mod seeder;

pub use driver::DatabaseDriver;
pub use model::{NewUser, User};
pub use repository::UserRepository;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::telemetry::Logger;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use sqlx::migrate::MigrateDatabase;

#[derive(Clone, Debug)]
pub struct Database {
    pool: AnyPool,
    driver: DatabaseDriver,
}

impl Database {
    /// Opens a pool for `config`, creating a missing sqlite file first.
    pub async fn connect(config: &DatabaseConfig, logger: &Logger) -> Result<Self> {
        let driver = config.driver;
        let url = driver.connection_url(&config.dsn)?;
        let connect_error = |source| Error::Connect {
            driver: driver.as_str(),
            source,
        };

        sqlx::any::install_default_drivers();

        let in_memory = driver == DatabaseDriver::Sqlite && is_in_memory(&url);
        if driver == DatabaseDriver::Sqlite && !in_memory {
            let exists = sqlx::Sqlite::database_exists(&url)
                .await
                .map_err(connect_error)?;
            if !exists {
                sqlx::Sqlite::create_database(&url)
                    .await
                    .map_err(connect_error)?;
            }
        }

        let pool = pool_options(config, in_memory)
            .connect(&url)
            .await
            .map_err(connect_error)?;

        logger.in_scope(|| {
            tracing::info!(
                driver = %driver,
                pool_max_open = config.pool_max_open,
                pool_max_idle = config.pool_max_idle,
                "database connected"
            )
        });

        Ok(Self { pool, driver })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn driver(&self) -> DatabaseDriver {
        self.driver
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(self.driver.users_table_ddl())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Waits for checked-out connections to be returned, then closes every
    /// pooled connection.
    pub async fn close(&self) -> Result<()> {
        if self.pool.is_closed() {
            return Err(Error::DatabaseClosed);
        }
        self.pool.close().await;
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains("mode=memory")
}

fn pool_options(config: &DatabaseConfig, in_memory: bool) -> AnyPoolOptions {
    // Every in-memory sqlite connection is its own store, so keep exactly one
    // alive for the lifetime of the pool.
    if in_memory {
        return AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .max_lifetime(None)
            .idle_timeout(None);
    }

    // sqlx has no cap on idle connections, only a floor (`min_connections`).
    // `pool_max_idle` is an upper bound, so it is not mapped onto the pool and
    // idle connections are reaped by the default idle timeout instead.
    let mut options = AnyPoolOptions::new();
    if config.pool_max_open > 0 {
        options = options.max_connections(config.pool_max_open);
    }
    let max_lifetime = (!config.pool_max_lifetime.is_zero()).then_some(config.pool_max_lifetime);

    options.max_lifetime(max_lifetime)
}
