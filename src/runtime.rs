use async_trait::async_trait;

use crate::error::SqlSessionError;
use crate::results::QueryResult;
use crate::types::DatabaseType;

/// Boundary to whatever executes SQL against a real database.
///
/// Implementations own the connection and the transaction state; this crate
/// only ever renders statements and interprets [`QueryResult`]s. Statement
/// failures are reported in-band through the result's failure flags, while
/// the transaction-control calls return `Err` when the runtime itself
/// cannot carry them out (lost connection, protocol error).
///
/// Callers must pair every `begin_transaction` with exactly one of
/// `commit`/`rollback` and always follow up with `end_transaction`,
/// including on error paths.
#[async_trait]
pub trait TransactionRuntime: Send {
    /// The dialect spoken by this runtime, used to pick the escaper.
    fn database_type(&self) -> DatabaseType;

    /// Start a transaction on the underlying connection.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if the transaction cannot be started.
    async fn begin_transaction(&mut self) -> Result<(), SqlSessionError>;

    /// Commit the open transaction.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if the commit cannot be issued.
    async fn commit(&mut self) -> Result<(), SqlSessionError>;

    /// Roll back the open transaction.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if the rollback cannot be issued.
    async fn rollback(&mut self) -> Result<(), SqlSessionError>;

    /// Release transaction bookkeeping after commit or rollback.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if the runtime cannot leave transaction
    /// mode.
    async fn end_transaction(&mut self) -> Result<(), SqlSessionError>;

    /// Execute one SQL statement. Failures are reported through the
    /// returned result, not through `Err`.
    async fn query(&mut self, sql: &str) -> QueryResult;
}
