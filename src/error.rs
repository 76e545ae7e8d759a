use thiserror::Error;

use crate::results::QueryResult;

/// Unified error type for escaping, query building, and session storage.
///
/// Validation variants (`InvalidLocationReference`, `InvalidUnionOperator`,
/// `InvalidArgument`) are raised before any statement reaches the transaction
/// runtime and are never worth retrying. `QueryError` wraps a failed
/// [`QueryResult`] verbatim; callers inspect [`SqlSessionError::is_retryable`]
/// to decide whether to re-run the whole operation.
#[derive(Debug, Clone, Error)]
pub enum SqlSessionError {
    #[error("Invalid location reference: {0}")]
    InvalidLocationReference(String),

    #[error("Invalid union operator: {0}")]
    InvalidUnionOperator(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database query error {number}: {message}")]
    QueryError {
        message: String,
        number: i32,
        lock_timeout: bool,
        deadlock: bool,
    },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl SqlSessionError {
    /// Build a `QueryError` from a failed result, carrying the backend
    /// message and error number along with the retry classification flags.
    #[must_use]
    pub fn from_result(result: &QueryResult) -> Self {
        SqlSessionError::QueryError {
            message: result.error_message().to_owned(),
            number: result.error_number(),
            lock_timeout: result.has_lock_timeout(),
            deadlock: result.has_deadlock(),
        }
    }

    /// Whether the backend flagged this failure as a lock timeout.
    #[must_use]
    pub fn has_lock_timeout(&self) -> bool {
        matches!(
            self,
            SqlSessionError::QueryError {
                lock_timeout: true,
                ..
            }
        )
    }

    /// Whether the backend flagged this failure as a deadlock.
    #[must_use]
    pub fn has_deadlock(&self) -> bool {
        matches!(self, SqlSessionError::QueryError { deadlock: true, .. })
    }

    /// Lock timeouts and deadlocks are transient; the caller may retry the
    /// whole operation. No retry loop runs inside this crate.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.has_lock_timeout() || self.has_deadlock()
    }
}
