//! Runtimes for exercising the session store without a database server.
//!
//! [`MockRuntime`] replays scripted results and records every call, which is
//! what the failure-path tests want. [`MemoryRuntime`] goes one step
//! further: it recognizes the statement shapes the session store renders
//! (MySQL dialect) and applies them to an in-memory table with
//! copy-on-begin transaction semantics, so round-trip behavior can be
//! tested end to end.

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::SqlSessionError;
use crate::results::QueryResult;
use crate::runtime::TransactionRuntime;
use crate::types::{DatabaseType, SqlValue};

/// One recorded call against a test runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Begin,
    Commit,
    Rollback,
    End,
    Query(String),
}

/// Scripted runtime: every `query` pops the next queued result (or a
/// zero-row success when the queue is empty) and every call is recorded
/// for later assertions.
pub struct MockRuntime {
    database_type: DatabaseType,
    responses: VecDeque<QueryResult>,
    calls: Vec<RuntimeCall>,
    fail_begin: bool,
}

impl MockRuntime {
    #[must_use]
    pub fn new(database_type: DatabaseType) -> Self {
        Self {
            database_type,
            responses: VecDeque::new(),
            calls: Vec::new(),
            fail_begin: false,
        }
    }

    /// Queue a result for the next unanswered `query` call.
    #[must_use]
    pub fn with_response(mut self, result: QueryResult) -> Self {
        self.responses.push_back(result);
        self
    }

    /// Make `begin_transaction` fail, for connection-loss paths.
    #[must_use]
    pub fn with_failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    /// The SQL text of every recorded `query` call, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RuntimeCall::Query(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.count(&RuntimeCall::Commit)
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.count(&RuntimeCall::Rollback)
    }

    #[must_use]
    pub fn ends(&self) -> usize {
        self.count(&RuntimeCall::End)
    }

    fn count(&self, call: &RuntimeCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl TransactionRuntime for MockRuntime {
    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    async fn begin_transaction(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Begin);
        if self.fail_begin {
            return Err(SqlSessionError::ConnectionError(
                "cannot start transaction".to_owned(),
            ));
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Rollback);
        Ok(())
    }

    async fn end_transaction(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::End);
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> QueryResult {
        self.calls.push(RuntimeCall::Query(sql.to_owned()));
        self.responses
            .pop_front()
            .unwrap_or_else(|| QueryResult::with_rows(Vec::new(), Vec::new()))
    }
}

static READ_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^SELECT `sessionData` FROM `[^`]+` WHERE `sessionID` = '([^']*)' AND `expires` >= (-?\d+)$",
    )
    .expect("static regex is valid")
});
static LOCK_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SELECT `sessionID` FROM `[^`]+` WHERE `sessionID` = '([^']*)' FOR UPDATE$")
        .expect("static regex is valid")
});
static REPLACE_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^REPLACE INTO `[^`]+` SET `sessionID` = '([^']*)', `sessionData` = '([^']*)', `expires` = (-?\d+)$",
    )
    .expect("static regex is valid")
});
static DELETE_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DELETE FROM `[^`]+` WHERE `sessionID` = '([^']*)'$")
        .expect("static regex is valid")
});
static GC_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DELETE FROM `[^`]+` WHERE `expires` < (-?\d+)$").expect("static regex is valid")
});

#[derive(Debug, Clone, Default)]
struct SessionTable {
    // sessionID -> (base64 payload, expires)
    rows: HashMap<String, (String, i64)>,
}

/// In-memory backend that interprets the exact statement shapes the
/// session store renders for the MySQL dialect. Transactions are
/// copy-on-begin: mutations go to a working copy that replaces the
/// committed table on commit and is dropped on rollback.
pub struct MemoryRuntime {
    committed: SessionTable,
    working: Option<SessionTable>,
    tx_open: bool,
    calls: Vec<RuntimeCall>,
}

impl MemoryRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: SessionTable::default(),
            working: None,
            tx_open: false,
            calls: Vec::new(),
        }
    }

    #[must_use]
    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    /// Number of committed session rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.committed.rows.len()
    }

    /// Committed expiry timestamp for a session, if the row exists.
    #[must_use]
    pub fn expires_of(&self, session_id: &str) -> Option<i64> {
        self.committed.rows.get(session_id).map(|(_, exp)| *exp)
    }

    fn table(&mut self) -> &mut SessionTable {
        self.working.as_mut().unwrap_or(&mut self.committed)
    }

    fn apply(&mut self, sql: &str) -> QueryResult {
        if let Some(caps) = READ_STMT.captures(sql) {
            let id = caps[1].to_owned();
            let cutoff: i64 = caps[2].parse().unwrap_or(0);
            let rows = match self.table().rows.get(&id) {
                Some((data, expires)) if *expires >= cutoff => {
                    vec![vec![SqlValue::Text(data.clone())]]
                }
                _ => Vec::new(),
            };
            return QueryResult::with_rows(vec!["sessionData".to_owned()], rows);
        }

        if let Some(caps) = LOCK_STMT.captures(sql) {
            let id = caps[1].to_owned();
            let rows = if self.table().rows.contains_key(&id) {
                vec![vec![SqlValue::Text(id)]]
            } else {
                Vec::new()
            };
            return QueryResult::with_rows(vec!["sessionID".to_owned()], rows);
        }

        if let Some(caps) = REPLACE_STMT.captures(sql) {
            let id = caps[1].to_owned();
            let data = caps[2].to_owned();
            let expires: i64 = caps[3].parse().unwrap_or(0);
            self.table().rows.insert(id, (data, expires));
            return QueryResult::success(1);
        }

        if let Some(caps) = DELETE_STMT.captures(sql) {
            let id = caps[1].to_owned();
            let removed = self.table().rows.remove(&id).is_some();
            return QueryResult::success(usize::from(removed));
        }

        if let Some(caps) = GC_STMT.captures(sql) {
            let cutoff: i64 = caps[1].parse().unwrap_or(0);
            let before = self.table().rows.len();
            self.table().rows.retain(|_, (_, expires)| *expires >= cutoff);
            let after = self.table().rows.len();
            return QueryResult::success(before - after);
        }

        QueryResult::failure(format!("unsupported statement: {sql}"), 1064)
    }
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRuntime for MemoryRuntime {
    fn database_type(&self) -> DatabaseType {
        // The statement matchers above are written against backtick
        // quoting, so this runtime always speaks MySQL.
        DatabaseType::MySql
    }

    async fn begin_transaction(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Begin);
        if self.tx_open {
            return Err(SqlSessionError::ExecutionError(
                "transaction already open".to_owned(),
            ));
        }
        self.tx_open = true;
        self.working = Some(self.committed.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Commit);
        match self.working.take() {
            Some(table) => {
                self.committed = table;
                Ok(())
            }
            None => Err(SqlSessionError::ExecutionError(
                "commit without open transaction".to_owned(),
            )),
        }
    }

    async fn rollback(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::Rollback);
        match self.working.take() {
            Some(_) => Ok(()),
            None => Err(SqlSessionError::ExecutionError(
                "rollback without open transaction".to_owned(),
            )),
        }
    }

    async fn end_transaction(&mut self) -> Result<(), SqlSessionError> {
        self.calls.push(RuntimeCall::End);
        if !self.tx_open {
            return Err(SqlSessionError::ExecutionError(
                "end_transaction without open transaction".to_owned(),
            ));
        }
        self.tx_open = false;
        // A transaction ended without commit/rollback loses its working copy.
        self.working = None;
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> QueryResult {
        self.calls.push(RuntimeCall::Query(sql.to_owned()));
        self.apply(sql)
    }
}
