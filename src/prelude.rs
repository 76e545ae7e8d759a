//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types to make it easier
//! to get started with the library.

pub use crate::error::SqlSessionError;
pub use crate::escaper::{MySqlQueryEscaper, QueryEscaper, SqliteQueryEscaper};
pub use crate::location::LocationRef;
pub use crate::query_builder::{DmlQueryBuilder, UnionOperator};
pub use crate::results::{DbRow, QueryResult};
pub use crate::runtime::TransactionRuntime;
pub use crate::session::{SessionStore, SessionStoreConfig};
pub use crate::types::{DatabaseType, SqlValue};
