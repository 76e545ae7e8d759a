use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlSessionError;

static AS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+as\s+").expect("static regex is valid"));

/// A parsed `"name"` or `"name AS alias"` reference, prior to any
/// dialect-specific escaping.
///
/// Table and column references share this grammar; the table/column
/// distinction lives in the escaper entry point that consumes the parsed
/// name. Only the first `AS` token acts as the separator; anything after it
/// is kept verbatim in the alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRef {
    name: String,
    alias: Option<String>,
}

impl LocationRef {
    /// Parse a raw location reference.
    ///
    /// The `AS` keyword is matched case-insensitively but the original case
    /// of `name` and `alias` is preserved.
    ///
    /// # Errors
    /// Returns `SqlSessionError::InvalidLocationReference` if the input is
    /// empty or consists only of whitespace.
    pub fn parse(raw: &str) -> Result<Self, SqlSessionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SqlSessionError::InvalidLocationReference(
                "empty location reference".to_owned(),
            ));
        }

        let (name, alias) = match AS_SEPARATOR.find(trimmed) {
            Some(separator) => (
                trimmed[..separator.start()].trim_end(),
                Some(trimmed[separator.end()..].trim_start().to_owned()),
            ),
            None => (trimmed, None),
        };

        if name.is_empty() {
            return Err(SqlSessionError::InvalidLocationReference(format!(
                "location reference '{trimmed}' has no name before AS"
            )));
        }

        Ok(Self {
            name: name.to_owned(),
            alias: alias.filter(|a| !a.is_empty()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Re-serialize with an already-escaped name, keeping the alias as
    /// parsed. `AS` is always emitted uppercase with one space on each side.
    #[must_use]
    pub fn serialize_escaped(&self, escaped_name: &str) -> String {
        match &self.alias {
            Some(alias) => format!("{escaped_name} AS {alias}"),
            None => escaped_name.to_owned(),
        }
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_reference() {
        let loc = LocationRef::parse("user_sessions").unwrap();
        assert_eq!(loc.name(), "user_sessions");
        assert_eq!(loc.alias(), None);
        assert_eq!(loc.to_string(), "user_sessions");
    }

    #[test]
    fn parses_alias_case_insensitively() {
        for raw in ["t1 AS alias", "t1 as alias", "t1 As alias", "t1 aS alias"] {
            let loc = LocationRef::parse(raw).unwrap();
            assert_eq!(loc.name(), "t1");
            assert_eq!(loc.alias(), Some("alias"));
            assert_eq!(loc.to_string(), "t1 AS alias");
        }
    }

    #[test]
    fn preserves_identifier_case() {
        let loc = LocationRef::parse("Users as U").unwrap();
        assert_eq!(loc.to_string(), "Users AS U");
    }

    #[test]
    fn first_as_token_wins() {
        let loc = LocationRef::parse("a AS b AS c").unwrap();
        assert_eq!(loc.name(), "a");
        assert_eq!(loc.alias(), Some("b AS c"));
    }

    #[test]
    fn does_not_split_inside_identifiers() {
        let loc = LocationRef::parse("astronauts").unwrap();
        assert_eq!(loc.name(), "astronauts");
        assert_eq!(loc.alias(), None);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let loc = LocationRef::parse("  t1   AS   x  ").unwrap();
        assert_eq!(loc.name(), "t1");
        assert_eq!(loc.alias(), Some("x"));
    }

    #[test]
    fn rejects_empty_reference() {
        for raw in ["", "   "] {
            assert!(matches!(
                LocationRef::parse(raw),
                Err(SqlSessionError::InvalidLocationReference(_))
            ));
        }
    }
}
