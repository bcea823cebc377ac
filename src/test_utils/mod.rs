//! Helpers for this crate's tests and for downstream integration tests.

use std::sync::LazyLock;
use tokio::runtime::Runtime;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
#[allow(dead_code)]
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

mod test_helpers;
pub use test_helpers::create_test_row;

/// Embedded `PostgreSQL` for integration tests
#[cfg(feature = "test-utils")]
pub mod postgres;

#[cfg(feature = "test-utils")]
pub use postgres::{EmbeddedPostgres, setup_postgres_embedded, stop_postgres_embedded};
