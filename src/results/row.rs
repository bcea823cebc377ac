use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::RowValues;

/// A row from a database query result
///
/// This struct represents a single row from a database query result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct DbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    // Shared across the rows of one result set to avoid repeated string comparisons
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

pub(crate) fn build_column_index(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    Arc::new(
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    )
}

impl DbRow {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `rows` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = build_column_index(&column_names);
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value from the row by column name
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Integer column shortcut; `None` when the column is missing, NULL, or not an integer.
    #[must_use]
    pub fn get_int(&self, column_name: &str) -> Option<i64> {
        self.get(column_name).and_then(RowValues::as_int).copied()
    }

    /// Text column shortcut; `None` when the column is missing, NULL, or not text.
    #[must_use]
    pub fn get_text(&self, column_name: &str) -> Option<&str> {
        self.get(column_name).and_then(RowValues::as_text)
    }
}

// Serializes as `{ column: value, .. }`, the shape route handlers hand to clients.
impl Serialize for DbRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.column_names.len()))?;
        for (name, value) in self.column_names.iter().zip(self.rows.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_row;

    #[test]
    fn lookup_by_name_and_index() {
        let row = create_test_row(
            vec!["id".into(), "name".into(), "imageurl".into()],
            vec![
                RowValues::Int(4),
                RowValues::Text("Ada".into()),
                RowValues::Null,
            ],
        );

        assert_eq!(row.get_int("id"), Some(4));
        assert_eq!(row.get_text("name"), Some("Ada"));
        assert!(row.get("imageurl").is_some_and(RowValues::is_null));
        assert!(row.get("missing").is_none());
        assert_eq!(row.get_by_index(1), Some(&RowValues::Text("Ada".into())));
    }

    #[test]
    fn serializes_as_object() {
        let row = create_test_row(
            vec!["id".into(), "url".into()],
            vec![RowValues::Int(9), RowValues::Text("https://img/9.png".into())],
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 9, "url": "https://img/9.png" }));
    }
}
