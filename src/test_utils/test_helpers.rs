use std::sync::Arc;

use crate::results::DbRow;
use crate::types::RowValues;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> DbRow {
    DbRow::new(Arc::new(column_names), values)
}
