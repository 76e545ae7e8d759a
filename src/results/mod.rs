use std::sync::Arc;

use crate::types::SqlValue;

mod row;

pub use row::DbRow;

/// Structured outcome of executing one statement against the transaction
/// runtime.
///
/// The session store never parses raw driver errors; everything it needs
/// is carried here: the failure flag, the retry classification
/// (lock timeout / deadlock), the backend message and error number, and
/// any returned rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    rows: Vec<DbRow>,
    affected_rows: usize,
    failed: bool,
    lock_timeout: bool,
    deadlock: bool,
    error_message: String,
    error_number: i32,
}

impl QueryResult {
    /// A successful DML result with an affected-row count.
    #[must_use]
    pub fn success(affected_rows: usize) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    /// A successful SELECT result. Column names are shared across rows.
    #[must_use]
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        let columns = Arc::new(columns);
        let rows = rows
            .into_iter()
            .map(|values| DbRow::new(Arc::clone(&columns), values))
            .collect::<Vec<_>>();
        Self {
            affected_rows: rows.len(),
            rows,
            ..Self::default()
        }
    }

    /// A failed result carrying the backend's message and error number.
    #[must_use]
    pub fn failure(message: impl Into<String>, number: i32) -> Self {
        Self {
            failed: true,
            error_message: message.into(),
            error_number: number,
            ..Self::default()
        }
    }

    /// Flag this failure as a lock wait timeout.
    #[must_use]
    pub fn with_lock_timeout(mut self) -> Self {
        self.lock_timeout = true;
        self
    }

    /// Flag this failure as a deadlock.
    #[must_use]
    pub fn with_deadlock(mut self) -> Self {
        self.deadlock = true;
        self
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub fn has_lock_timeout(&self) -> bool {
        self.lock_timeout
    }

    #[must_use]
    pub fn has_deadlock(&self) -> bool {
        self.deadlock
    }

    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    #[must_use]
    pub fn error_number(&self) -> i32 {
        self.error_number
    }

    /// Number of returned rows, or -1 when the statement failed and the
    /// count is unknowable.
    #[must_use]
    pub fn number_of_rows(&self) -> i64 {
        if self.failed {
            -1
        } else {
            self.rows.len() as i64
        }
    }

    #[must_use]
    pub fn affected_rows(&self) -> usize {
        self.affected_rows
    }

    #[must_use]
    pub fn rows(&self) -> &[DbRow] {
        &self.rows
    }

    /// The named cell of the first row, if any.
    #[must_use]
    pub fn result_cell(&self, column: &str) -> Option<&SqlValue> {
        self.rows.first().and_then(|row| row.get(column))
    }
}
