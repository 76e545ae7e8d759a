use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A single row of a query result.
///
/// Column names are shared across all rows of a result set via `Arc`, with
/// a name-to-index cache so repeated lookups skip the string comparisons.
#[derive(Debug, Clone)]
pub struct DbRow {
    columns: Arc<Vec<String>>,
    values: Vec<SqlValue>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl DbRow {
    #[must_use]
    pub fn new(columns: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        let cache = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );

        Self {
            columns,
            values,
            column_index_cache: cache,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the index of a column by name.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column) {
            return Some(idx);
        }
        self.columns.iter().position(|name| name == column)
    }

    /// Get a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.column_index(column).and_then(|idx| self.values.get(idx))
    }

    /// Get a value by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}
