use postgresql_embedded::PostgreSQL;

use super::SHARED_RUNTIME;
use crate::SCHEMA;
use crate::config::{DEFAULT_DBNAME, DoodleDbConfig};
use crate::pool::DoodlePool;
use crate::postgres::AsyncDatabaseExecutor;

/// A running embedded `PostgreSQL` instance with the doodle schema applied.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    /// Settings that reach the instance, ready for [`DoodlePool::new`]
    pub config: DoodleDbConfig,
}

/// Start a throwaway server, create the `doodle` database and load [`SCHEMA`]
/// into it.
///
/// Each call gets its own server and data directory, so tests that call this
/// do not see each other's rows.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, or if
/// creating the database or applying the schema fails.
pub fn setup_postgres_embedded() -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(DEFAULT_DBNAME).await?;

        let settings = postgresql.settings();
        let mut config = DoodleDbConfig::new(settings.username.clone(), settings.password.clone());
        config.host = settings.host.clone();
        config.port = settings.port;

        let pool = DoodlePool::new(config.clone()).await?;
        let conn = pool.get_connection().await?;
        conn.execute_batch(SCHEMA).await?;
        tracing::debug!(port = config.port, "embedded postgres ready");

        Ok(EmbeddedPostgres { postgresql, config })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
