use deadpool_postgres::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoodleDbError {
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error(transparent)]
    PoolError(#[from] PoolError),

    #[error(transparent)]
    TlsError(#[from] native_tls::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DoodleDbError {
    /// True for input that was rejected before any SQL ran.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The SQLSTATE code when the database rejected a statement, e.g. `23505`
    /// for a unique violation.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::PostgresError(err) => err.code().map(tokio_postgres::error::SqlState::code),
            _ => None,
        }
    }
}
