use deadpool_postgres::{Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::NoTls;

use crate::config::{DoodleDbConfig, TlsMode};
use crate::error::DoodleDbError;

/// Configuration and connection pool for the doodle database
///
/// Built once at startup and cloned into whatever needs it; clones share the
/// same underlying pool.
#[derive(Clone, Debug)]
pub struct DoodlePool {
    /// The connection pool
    pub pool: Pool,
    /// Settings the pool was built from
    pub config: DoodleDbConfig,
}

impl DoodlePool {
    /// Asynchronous initializer for `DoodlePool`
    ///
    /// No connection is opened until the first checkout.
    ///
    /// # Errors
    /// Returns `DoodleDbError::ConfigError` if required config fields are missing,
    /// `DoodleDbError::TlsError` if the TLS connector cannot be built, or
    /// `DoodleDbError::ConnectionError` if pool creation fails.
    #[allow(clippy::unused_async)]
    pub async fn new(config: DoodleDbConfig) -> Result<Self, DoodleDbError> {
        let pg_config = config.to_pg_config()?;

        let created = match config.tls {
            TlsMode::Disable => pg_config.create_pool(Some(Runtime::Tokio1), NoTls),
            TlsMode::Require => {
                let connector = MakeTlsConnector::new(TlsConnector::builder().build()?);
                pg_config.create_pool(Some(Runtime::Tokio1), connector)
            }
        };
        let pool = created.map_err(|e| {
            DoodleDbError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
        })?;

        tracing::info!(
            host = %config.host,
            dbname = %config.dbname,
            port = config.port,
            tls = ?config.tls,
            "doodle database pool created"
        );

        Ok(Self { pool, config })
    }

    /// Get a connection from the pool
    ///
    /// # Errors
    /// Returns `DoodleDbError::PoolError` if the pool fails to provide a connection.
    pub async fn get_connection(&self) -> Result<Object, DoodleDbError> {
        Ok(self.pool.get().await?)
    }
}
