//! Data access layer for the doodle sharing app.
//!
//! Everything goes through [`DoodleDal`], which wraps a pooled Postgres
//! connection set up from [`DoodleDbConfig`]:
//!
//! ```rust,no_run
//! use doodle_dal::prelude::*;
//!
//! # async fn run() -> Result<(), DoodleDbError> {
//! let pool = DoodlePool::new(DoodleDbConfig::from_env()?).await?;
//! let dal = DoodleDal::new(pool);
//!
//! let doodles = dal.get_user_doodles(parse_id("userId", "12")?).await?;
//! for doodle in &doodles {
//!     println!("{:?} has {:?} likes", doodle.get_int("id"), doodle.get_int("count"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Rows come back as [`ResultSet`]s of [`DbRow`]s keyed by column name, and
//! serialize to JSON objects with those same keys. The schema the queries
//! expect is in `sql/schema.sql` and exported as [`SCHEMA`].

pub mod config;
pub mod dal;
pub mod error;
pub mod inputs;
pub mod pool;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{DoodleDbConfig, TlsMode};
pub use dal::{AddFriendOutcome, BioWrite, CommentWithAuthor, DoodleDal};
pub use error::DoodleDbError;
pub use pool::DoodlePool;
pub use results::{DbRow, ResultSet};
pub use types::RowValues;

/// DDL for every table the queries touch.
pub const SCHEMA: &str = include_str!("../sql/schema.sql");
