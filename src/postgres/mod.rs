// PostgreSQL module - the plumbing every DAL operation goes through
//
// - params: binding `RowValues` as tokio-postgres parameters
// - query: extracting rows into a `ResultSet`
// - transaction: the `Tx` wrapper used by multi-statement operations
// - executor: auto-commit execution on a pooled connection

pub mod executor;
pub mod params;
pub mod query;
pub mod transaction;

pub use executor::{AsyncDatabaseExecutor, insert_returning_id};
pub use params::Params;
pub use query::build_result_set;
pub use transaction::{Tx, begin_transaction};
