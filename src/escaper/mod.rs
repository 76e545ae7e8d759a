use std::borrow::Cow;

use crate::error::SqlSessionError;
use crate::types::SqlValue;

mod mysql;
mod sqlite;

pub use mysql::MySqlQueryEscaper;
pub use sqlite::SqliteQueryEscaper;

/// Dialect-specific escaping of identifiers and literals.
///
/// Implementations are pure and stateless: the same input always produces
/// the same SQL fragment and no I/O happens here. Table and column
/// identifiers go through distinct entry points because quoting rules can
/// diverge between the two contexts (`SQLite`'s `INDEXED BY` hint, for
/// example, only exists for table references).
pub trait QueryEscaper: Send + Sync {
    /// Quote and escape a table identifier. Qualified names (`db.table`)
    /// are quoted per segment.
    fn table(&self, name: &str) -> String;

    /// Quote and escape a column identifier. Qualified names (`t.column`)
    /// are quoted per segment.
    fn column(&self, name: &str) -> String;

    /// Escape and quote a literal value for inclusion in SQL text.
    ///
    /// # Errors
    /// Returns `SqlSessionError::InvalidArgument` for non-scalar input
    /// (JSON documents).
    fn value(&self, value: &SqlValue) -> Result<String, SqlSessionError>;

    /// Render an unquoted integer literal.
    ///
    /// # Errors
    /// Returns `SqlSessionError::InvalidArgument` if the value has no
    /// integer representation.
    fn intvalue(&self, value: &SqlValue) -> Result<String, SqlSessionError>;

    /// Escape a column name used in a SELECT projection list. `*` passes
    /// through untouched and `t.*` keeps its wildcard suffix.
    fn result_column(&self, name: &str) -> String;
}

/// Quote each dot-separated segment of an identifier, doubling any embedded
/// quote characters.
pub(crate) fn quote_identifier(name: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    name.trim()
        .split('.')
        .map(|part| {
            let escaped = part.trim().replace(quote, &doubled);
            format!("{quote}{escaped}{quote}")
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Projection-list escaping shared by both dialects.
pub(crate) fn result_column_with(name: &str, quote: char) -> String {
    let trimmed = name.trim();
    if trimmed == "*" {
        return trimmed.to_owned();
    }
    if let Some(prefix) = trimmed.strip_suffix(".*") {
        return format!("{}.*", quote_identifier(prefix, quote));
    }
    quote_identifier(trimmed, quote)
}

/// Render a scalar as a quoted literal, delegating only the text-escaping
/// step to the dialect. Matches the behavior of the original escapers:
/// every scalar is emitted inside single quotes, NULL and blobs excepted.
pub(crate) fn render_quoted_scalar<F>(
    value: &SqlValue,
    escape_text: F,
) -> Result<String, SqlSessionError>
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    match value {
        SqlValue::Null => Ok("NULL".to_owned()),
        SqlValue::Int(i) => Ok(format!("'{i}'")),
        SqlValue::Float(f) => Ok(format!("'{f}'")),
        SqlValue::Bool(b) => Ok(if *b { "'1'" } else { "'0'" }.to_owned()),
        SqlValue::Text(s) => Ok(format!("'{}'", escape_text(s))),
        SqlValue::Timestamp(ts) => Ok(format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S"))),
        SqlValue::Blob(bytes) => Ok(hex_literal(bytes)),
        SqlValue::JSON(_) => Err(SqlSessionError::InvalidArgument(
            "cannot escape non-scalar value".to_owned(),
        )),
    }
}

/// Render an unquoted integer literal; shared by both dialects.
pub(crate) fn integer_literal(value: &SqlValue) -> Result<String, SqlSessionError> {
    match value {
        SqlValue::Int(i) => Ok(i.to_string()),
        SqlValue::Bool(b) => Ok(if *b { "1" } else { "0" }.to_owned()),
        SqlValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| i.to_string())
            .map_err(|_| {
                SqlSessionError::InvalidArgument(format!("'{s}' is not an integer literal"))
            }),
        other => Err(SqlSessionError::InvalidArgument(format!(
            "{other:?} has no integer representation"
        ))),
    }
}

pub(crate) fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_qualified_identifiers_per_segment() {
        assert_eq!(quote_identifier("db.table", '`'), "`db`.`table`");
        assert_eq!(quote_identifier("col", '"'), "\"col\"");
    }

    #[test]
    fn doubles_embedded_quote_characters() {
        assert_eq!(quote_identifier("we`ird", '`'), "`we``ird`");
        assert_eq!(quote_identifier("we\"ird", '"'), "\"we\"\"ird\"");
    }

    #[test]
    fn star_projections_pass_through() {
        assert_eq!(result_column_with("*", '`'), "*");
        assert_eq!(result_column_with("t.*", '`'), "`t`.*");
    }

    #[test]
    fn integer_literal_accepts_integer_shapes() {
        assert_eq!(integer_literal(&SqlValue::Int(42)).unwrap(), "42");
        assert_eq!(integer_literal(&SqlValue::Bool(true)).unwrap(), "1");
        assert_eq!(
            integer_literal(&SqlValue::Text(" 17 ".into())).unwrap(),
            "17"
        );
        assert!(integer_literal(&SqlValue::Text("abc".into())).is_err());
        assert!(integer_literal(&SqlValue::Null).is_err());
    }

    #[test]
    fn hex_literal_renders_uppercase_pairs() {
        assert_eq!(hex_literal(&[0xAB, 0x01]), "X'AB01'");
    }
}
