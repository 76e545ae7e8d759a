use std::borrow::Cow;

use crate::error::SqlSessionError;
use crate::types::SqlValue;

use super::{
    QueryEscaper, integer_literal, quote_identifier, render_quoted_scalar, result_column_with,
};

const QUOTE: char = '"';

/// Escaper for the `SQLite` dialect: double-quoted identifiers and
/// quote-doubling string escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQueryEscaper;

impl QueryEscaper for SqliteQueryEscaper {
    fn table(&self, name: &str) -> String {
        quote_identifier(name, QUOTE)
    }

    fn column(&self, name: &str) -> String {
        quote_identifier(name, QUOTE)
    }

    fn value(&self, value: &SqlValue) -> Result<String, SqlSessionError> {
        render_quoted_scalar(value, escape_string)
    }

    fn intvalue(&self, value: &SqlValue) -> Result<String, SqlSessionError> {
        integer_literal(value)
    }

    fn result_column(&self, name: &str) -> String {
        result_column_with(name, QUOTE)
    }
}

impl SqliteQueryEscaper {
    /// Escape a table reference carrying an `INDEXED BY` hint. The hint only
    /// exists for table contexts, which is why it lives on the `SQLite`
    /// escaper rather than on the shared trait.
    #[must_use]
    pub fn table_indexed_by(&self, name: &str, index: &str) -> String {
        format!(
            "{} INDEXED BY {}",
            quote_identifier(name, QUOTE),
            quote_identifier(index, QUOTE)
        )
    }
}

/// `SQLite` string escaping doubles embedded single quotes; everything else
/// passes through. Returns a borrowed `Cow` when nothing needs escaping.
fn escape_string(input: &str) -> Cow<'_, str> {
    if input.contains('\'') {
        Cow::Owned(input.replace('\'', "''"))
    } else {
        Cow::Borrowed(input)
    }
}
