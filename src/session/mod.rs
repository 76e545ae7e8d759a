use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::SqlSessionError;
use crate::escaper::QueryEscaper;
use crate::query_builder::DmlQueryBuilder;
use crate::results::QueryResult;
use crate::runtime::TransactionRuntime;
use crate::types::SqlValue;

const SESSION_ID_COLUMN: &str = "sessionID";
const SESSION_DATA_COLUMN: &str = "sessionData";
const EXPIRES_COLUMN: &str = "expires";

/// Options for the session store: the backing table and the lock clause
/// used by the read-modify-write protocol.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    pub table: String,
    pub lock_mode: String,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            table: "user_sessions".to_owned(),
            lock_mode: "FOR UPDATE".to_owned(),
        }
    }
}

impl SessionStoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    #[must_use]
    pub fn with_lock_mode(mut self, lock_mode: impl Into<String>) -> Self {
        self.lock_mode = lock_mode.into();
        self
    }
}

/// Session persistence over a [`TransactionRuntime`].
///
/// Rows live in the `user_sessions` table keyed by `sessionID`, with the
/// payload base64-encoded at rest and an `expires` unix timestamp. Writes
/// and deletes serialize concurrent access per session through a locking
/// SELECT inside a transaction; correctness relies on the database row
/// lock, never on process-local state, so stores in different processes
/// can safely target the same table.
///
/// Failed statements surface as [`SqlSessionError::QueryError`] carrying
/// the backend's lock-timeout/deadlock classification. The store never
/// retries internally; retry policy stays with the caller.
pub struct SessionStore<R> {
    runtime: R,
    config: SessionStoreConfig,
}

impl<R: TransactionRuntime> SessionStore<R> {
    #[must_use]
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, SessionStoreConfig::default())
    }

    #[must_use]
    pub fn with_config(runtime: R, config: SessionStoreConfig) -> Self {
        Self { runtime, config }
    }

    #[must_use]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn into_runtime(self) -> R {
        self.runtime
    }

    fn escaper(&self) -> &'static dyn QueryEscaper {
        self.runtime.database_type().escaper()
    }

    /// Read a session's payload. Expired rows are filtered out at query
    /// time, so a stale session reads the same as a missing one.
    ///
    /// A bare read runs outside any transaction and is never retried here,
    /// whatever the failure classification says.
    ///
    /// # Errors
    /// Returns `SqlSessionError::QueryError` if the statement fails, or
    /// `SqlSessionError::ExecutionError` if the stored payload cannot be
    /// decoded.
    pub async fn read(&mut self, session_id: &str) -> Result<Option<Vec<u8>>, SqlSessionError> {
        let escaper = self.escaper();
        let now = Utc::now().timestamp();
        let sql = DmlQueryBuilder::new(escaper)
            .select(&escaper.result_column(SESSION_DATA_COLUMN))
            .from(&self.config.table)
            .where_clause(
                &escaper.column(SESSION_ID_COLUMN),
                "=",
                &escaper.value(&SqlValue::Text(session_id.to_owned()))?,
            )
            .where_clause(
                &escaper.column(EXPIRES_COLUMN),
                ">=",
                &escaper.intvalue(&SqlValue::Int(now))?,
            )
            .select_query()?;

        let result = self.run(&sql).await;
        if result.has_failed() {
            return Err(self.query_error(&result));
        }
        if result.number_of_rows() == 0 {
            return Ok(None);
        }

        let encoded = result
            .result_cell(SESSION_DATA_COLUMN)
            .and_then(SqlValue::as_text)
            .ok_or_else(|| {
                SqlSessionError::ExecutionError(format!(
                    "session row for '{session_id}' has no readable {SESSION_DATA_COLUMN} cell"
                ))
            })?;
        let decoded = BASE64.decode(encoded).map_err(|e| {
            SqlSessionError::ExecutionError(format!(
                "session data for '{session_id}' is not valid base64: {e}"
            ))
        })?;
        Ok(Some(decoded))
    }

    /// Write a session row, replacing any previous row for the same id.
    ///
    /// The write runs as lock-then-replace inside one transaction: a
    /// `SELECT ... FOR UPDATE` pins the existing row so concurrent writers
    /// for the same session serialize at the database, then a REPLACE swaps
    /// the whole row. Both statements are rendered before the transaction
    /// starts, so validation failures never leave a transaction open.
    ///
    /// # Errors
    /// Returns `SqlSessionError::QueryError` when either statement fails;
    /// the transaction is rolled back and ended first.
    pub async fn write(
        &mut self,
        session_id: &str,
        data: &[u8],
        expires: i64,
    ) -> Result<(), SqlSessionError> {
        let escaper = self.escaper();
        let id_value = escaper.value(&SqlValue::Text(session_id.to_owned()))?;

        let lock_sql = DmlQueryBuilder::new(escaper)
            .select(&escaper.column(SESSION_ID_COLUMN))
            .from(&self.config.table)
            .where_clause(&escaper.column(SESSION_ID_COLUMN), "=", &id_value)
            .lock_mode(&self.config.lock_mode)
            .select_query()?;

        let encoded = BASE64.encode(data);
        let replace_sql = DmlQueryBuilder::new(escaper)
            .into_table(&self.config.table)
            .set([
                (escaper.column(SESSION_ID_COLUMN), id_value),
                (
                    escaper.column(SESSION_DATA_COLUMN),
                    escaper.value(&SqlValue::Text(encoded))?,
                ),
                (
                    escaper.column(EXPIRES_COLUMN),
                    escaper.intvalue(&SqlValue::Int(expires))?,
                ),
            ])
            .replace_query()?;

        self.runtime.begin_transaction().await?;

        let lock_result = self.run(&lock_sql).await;
        if lock_result.has_failed() {
            let error = self.query_error(&lock_result);
            self.abort().await;
            return Err(error);
        }

        let replace_result = self.run(&replace_sql).await;
        if replace_result.has_failed() {
            let error = self.query_error(&replace_result);
            self.abort().await;
            return Err(error);
        }

        self.finish_commit().await
    }

    /// Delete a session row. A missing row is a no-op, not an error.
    ///
    /// Uses the same lock-then-act shape as [`write`](Self::write): the
    /// locking SELECT doubles as the existence check, so the DELETE only
    /// runs when there is exactly one row to remove.
    ///
    /// # Errors
    /// Returns `SqlSessionError::QueryError` when the locking SELECT or the
    /// DELETE fails; the transaction is rolled back and ended first.
    pub async fn delete(&mut self, session_id: &str) -> Result<(), SqlSessionError> {
        let escaper = self.escaper();
        let id_value = escaper.value(&SqlValue::Text(session_id.to_owned()))?;

        let lock_sql = DmlQueryBuilder::new(escaper)
            .select(&escaper.column(SESSION_ID_COLUMN))
            .from(&self.config.table)
            .where_clause(&escaper.column(SESSION_ID_COLUMN), "=", &id_value)
            .lock_mode(&self.config.lock_mode)
            .select_query()?;

        let delete_sql = DmlQueryBuilder::new(escaper)
            .from(&self.config.table)
            .where_clause(&escaper.column(SESSION_ID_COLUMN), "=", &id_value)
            .delete_query()?;

        self.runtime.begin_transaction().await?;

        let lock_result = self.run(&lock_sql).await;
        let rows = lock_result.number_of_rows();
        if rows < 0 {
            let error = self.query_error(&lock_result);
            self.abort().await;
            return Err(error);
        }
        if rows == 0 {
            debug!(session_id, "no session row to delete");
            self.abort().await;
            return Ok(());
        }

        let delete_result = self.run(&delete_sql).await;
        if delete_result.has_failed() {
            let error = self.query_error(&delete_result);
            self.abort().await;
            return Err(error);
        }

        self.finish_commit().await
    }

    /// Garbage-collect sessions that expired before `cutoff`. Rows with
    /// `expires >= cutoff` are left untouched.
    ///
    /// Runs as a single statement with no transaction; there is nothing to
    /// roll back on failure.
    ///
    /// # Errors
    /// Returns `SqlSessionError::QueryError` if the DELETE fails.
    pub async fn gc(&mut self, cutoff: i64) -> Result<(), SqlSessionError> {
        let escaper = self.escaper();
        let sql = DmlQueryBuilder::new(escaper)
            .from(&self.config.table)
            .where_clause(
                &escaper.column(EXPIRES_COLUMN),
                "<",
                &escaper.intvalue(&SqlValue::Int(cutoff))?,
            )
            .delete_query()?;

        let result = self.run(&sql).await;
        if result.has_failed() {
            return Err(self.query_error(&result));
        }
        debug!(affected = result.affected_rows(), "session gc complete");
        Ok(())
    }

    async fn run(&mut self, sql: &str) -> QueryResult {
        debug!(sql, "executing session statement");
        self.runtime.query(sql).await
    }

    fn query_error(&self, result: &QueryResult) -> SqlSessionError {
        warn!(
            message = result.error_message(),
            number = result.error_number(),
            lock_timeout = result.has_lock_timeout(),
            deadlock = result.has_deadlock(),
            "session statement failed"
        );
        SqlSessionError::from_result(result)
    }

    /// Failure path: roll back and end the transaction, logging but never
    /// propagating secondary failures so the primary error survives.
    async fn abort(&mut self) {
        if let Err(error) = self.runtime.rollback().await {
            warn!(%error, "rollback failed");
        }
        if let Err(error) = self.runtime.end_transaction().await {
            warn!(%error, "end transaction failed");
        }
    }

    /// Success path: commit, then end the transaction regardless of the
    /// commit outcome. A commit failure takes precedence over an
    /// end-transaction failure.
    async fn finish_commit(&mut self) -> Result<(), SqlSessionError> {
        let committed = self.runtime.commit().await;
        let ended = self.runtime.end_transaction().await;
        if let Err(error) = &ended {
            warn!(%error, "end transaction failed");
        }
        committed?;
        ended
    }
}
