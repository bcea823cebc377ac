//! The doodle app's named queries, grouped by the entity they serve.
//!
//! Every operation borrows one pooled connection for its whole duration.
//! Operations that need more than one statement run inside a single
//! transaction, so a failure part-way leaves nothing half-written.

mod bios;
mod comments;
mod doodles;
mod friends;
mod users;

pub use bios::BioWrite;
pub use comments::CommentWithAuthor;
pub use friends::AddFriendOutcome;
pub use users::FUZZY_MATCH_LIMIT;

use crate::error::DoodleDbError;
use crate::pool::DoodlePool;
use crate::postgres::{AsyncDatabaseExecutor, insert_returning_id};
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

/// Entry point for every query the app runs.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct DoodleDal {
    pool: DoodlePool,
}

impl DoodleDal {
    #[must_use]
    pub fn new(pool: DoodlePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &DoodlePool {
        &self.pool
    }

    async fn select(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, DoodleDbError> {
        let conn = self.pool.get_connection().await?;
        conn.execute_select(query, params).await
    }

    async fn select_one(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Option<DbRow>, DoodleDbError> {
        Ok(self.select(query, params).await?.into_first())
    }

    async fn dml(&self, query: &str, params: &[RowValues]) -> Result<usize, DoodleDbError> {
        let conn = self.pool.get_connection().await?;
        conn.execute_dml(query, params).await
    }

    async fn insert_id(&self, query: &str, params: &[RowValues]) -> Result<i64, DoodleDbError> {
        let conn = self.pool.get_connection().await?;
        insert_returning_id(&conn, query, params).await
    }
}
