//! Errors raised by the server, the store and the seeder.

use crate::config::ConfigError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unsupported database driver {0:?}, expected one of postgres, mysql, sqlite")]
    UnsupportedDriver(String),

    #[error("invalid database DSN: {0}")]
    InvalidDsn(String),

    #[error("failed to connect to {driver} database: {source}")]
    Connect {
        driver: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("database is already closed")]
    DatabaseClosed,

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("failed to build reflection service: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    #[error("seed {name} failed: {source}")]
    Seed {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the error is a lookup that matched no row.
    pub fn is_row_not_found(&self) -> bool {
        matches!(self, Error::Query(sqlx::Error::RowNotFound))
    }
}
