use async_trait::async_trait;
use deadpool_postgres::Object;

use super::transaction::Tx;
use super::{Params, build_result_set};
use crate::error::DoodleDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Runs statements against either a pooled connection (auto-commit) or an
/// open transaction, so single-statement helpers can serve both.
#[async_trait]
pub trait AsyncDatabaseExecutor {
    /// Executes a batch of SQL statements. No parameters are supported.
    async fn execute_batch(&self, query: &str) -> Result<(), DoodleDbError>;

    /// Executes a single SELECT statement and returns the result set.
    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DoodleDbError>;

    /// Executes a single DML statement (INSERT, UPDATE, DELETE) and returns the number of rows affected.
    async fn execute_dml(&self, query: &str, params: &[RowValues]) -> Result<usize, DoodleDbError>;
}

#[async_trait]
impl AsyncDatabaseExecutor for Object {
    async fn execute_batch(&self, query: &str) -> Result<(), DoodleDbError> {
        self.batch_execute(query).await?;
        Ok(())
    }

    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DoodleDbError> {
        tracing::trace!(sql = query, "select");
        let stmt = self.prepare_cached(query).await?;
        let rows = self.query(&stmt, Params::convert(params).as_refs()).await?;
        build_result_set(&stmt, &rows)
    }

    async fn execute_dml(&self, query: &str, params: &[RowValues]) -> Result<usize, DoodleDbError> {
        tracing::trace!(sql = query, "dml");
        let stmt = self.prepare_cached(query).await?;
        let rows = self.execute(&stmt, Params::convert(params).as_refs()).await?;
        usize::try_from(rows).map_err(|e| {
            DoodleDbError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
        })
    }
}

#[async_trait]
impl AsyncDatabaseExecutor for Tx<'_> {
    async fn execute_batch(&self, query: &str) -> Result<(), DoodleDbError> {
        Tx::execute_batch(self, query).await
    }

    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DoodleDbError> {
        Tx::execute_select(self, query, params).await
    }

    async fn execute_dml(&self, query: &str, params: &[RowValues]) -> Result<usize, DoodleDbError> {
        Tx::execute_dml(self, query, params).await
    }
}

/// Run an `INSERT ... RETURNING id` and hand back the generated id.
///
/// # Errors
/// Returns `ExecutionError` if the statement produced no integer `id`.
pub async fn insert_returning_id<E>(
    exec: &E,
    query: &str,
    params: &[RowValues],
) -> Result<i64, DoodleDbError>
where
    E: AsyncDatabaseExecutor + Sync + ?Sized,
{
    exec.execute_select(query, params)
        .await?
        .into_first()
        .and_then(|row| row.get_int("id"))
        .ok_or_else(|| DoodleDbError::ExecutionError("insert returned no id".to_string()))
}
