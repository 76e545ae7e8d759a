//! Dialect-aware SQL escaping, DML query building, and transactional
//! session storage.
//!
//! The crate is layered bottom-up: [`escaper`] turns identifiers and
//! values into dialect-safe fragments, [`location`] parses
//! `"name AS alias"` references, [`query_builder`] accumulates clauses
//! into SELECT/REPLACE/DELETE statements, and [`session`] drives all of
//! it through a [`runtime::TransactionRuntime`] to persist sessions with
//! pessimistic row locking.
//!
//! ```rust
//! use sql_session_store::prelude::*;
//!
//! let escaper = DatabaseType::MySql.escaper();
//! let sql = DatabaseType::MySql
//!     .dml_query_builder()
//!     .select(&escaper.result_column("sessionData"))
//!     .from("user_sessions")
//!     .where_clause(
//!         &escaper.column("sessionID"),
//!         "=",
//!         &escaper.value(&SqlValue::Text("abc".into()))?,
//!     )
//!     .select_query()?;
//! assert_eq!(
//!     sql,
//!     "SELECT `sessionData` FROM `user_sessions` WHERE `sessionID` = 'abc'"
//! );
//! # Ok::<(), SqlSessionError>(())
//! ```

pub mod error;
pub mod escaper;
pub mod location;
pub mod query_builder;
pub mod results;
pub mod runtime;
pub mod session;
pub mod types;

pub mod prelude;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::SqlSessionError;
pub use escaper::QueryEscaper;
pub use location::LocationRef;
pub use query_builder::DmlQueryBuilder;
pub use results::QueryResult;
pub use runtime::TransactionRuntime;
pub use session::{SessionStore, SessionStoreConfig};
pub use types::{DatabaseType, SqlValue};
