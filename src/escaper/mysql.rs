use std::borrow::Cow;

use crate::error::SqlSessionError;
use crate::types::SqlValue;

use super::{
    QueryEscaper, integer_literal, quote_identifier, render_quoted_scalar, result_column_with,
};

const QUOTE: char = '`';

/// Escaper for the `MySQL` dialect: backtick-quoted identifiers and
/// backslash string escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQueryEscaper;

impl QueryEscaper for MySqlQueryEscaper {
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

/// Escape the characters `MySQL` treats specially inside string literals.
/// Returns a borrowed `Cow` when nothing needs escaping.
fn escape_string(input: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;

    for (idx, ch) in input.char_indices() {
        let replacement = match ch {
            '\\' => Some("\\\\"),
            '\'' => Some("\\'"),
            '"' => Some("\\\""),
            '\0' => Some("\\0"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\x1a' => Some("\\Z"),
            _ => None,
        };

        match (replacement, &mut out) {
            (Some(rep), Some(buf)) => buf.push_str(rep),
            (Some(rep), None) => {
                let mut buf = input[..idx].to_owned();
                buf.push_str(rep);
                out = Some(buf);
            }
            (None, Some(buf)) => buf.push(ch),
            (None, None) => {}
        }
    }

    match out {
        Some(buf) => Cow::Owned(buf),
        None => Cow::Borrowed(input),
    }
}
