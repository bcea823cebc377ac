use deadpool_postgres::{Object, Transaction as PgTransaction};

use crate::error::DoodleDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::{Params, build_result_set};

/// Lightweight transaction wrapper for Postgres.
///
/// Dropping a `Tx` without calling [`Tx::commit`] rolls it back.
pub struct Tx<'a> {
    tx: PgTransaction<'a>,
}

/// Begin a new transaction on the provided Postgres connection.
///
/// # Errors
/// Returns an error if creating the transaction fails.
pub async fn begin_transaction(conn: &mut Object) -> Result<Tx<'_>, DoodleDbError> {
    let tx = conn.transaction().await?;
    Ok(Tx { tx })
}

impl Tx<'_> {
    /// Execute a parameterized DML statement and return the affected row count.
    ///
    /// # Errors
    /// Returns an error if preparation, execution, or row-count conversion fails.
    pub async fn execute_dml(&self, sql: &str, params: &[RowValues]) -> Result<usize, DoodleDbError> {
        tracing::trace!(sql, "tx dml");
        let stmt = self.tx.prepare_cached(sql).await?;
        let rows = self.tx.execute(&stmt, Params::convert(params).as_refs()).await?;
        usize::try_from(rows).map_err(|e| {
            DoodleDbError::ExecutionError(format!("Invalid rows affected count: {e}"))
        })
    }

    /// Execute a parameterized SELECT and return a `ResultSet`.
    ///
    /// # Errors
    /// Returns an error if preparation, execution, or result building fails.
    pub async fn execute_select(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DoodleDbError> {
        tracing::trace!(sql, "tx select");
        let stmt = self.tx.prepare_cached(sql).await?;
        let rows = self.tx.query(&stmt, Params::convert(params).as_refs()).await?;
        build_result_set(&stmt, &rows)
    }

    /// Execute a batch of SQL statements inside the transaction.
    ///
    /// # Errors
    /// Returns an error if execution fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DoodleDbError> {
        self.tx.batch_execute(sql).await?;
        Ok(())
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns an error if commit fails.
    pub async fn commit(self) -> Result<(), DoodleDbError> {
        self.tx.commit().await?;
        Ok(())
    }
}
