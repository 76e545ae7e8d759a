use crate::error::SqlSessionError;
use crate::escaper::QueryEscaper;
use crate::location::LocationRef;

mod dml;
mod select;

/// Union operator argument. The builder accepts the operator strings `""`,
/// `"ALL"` and `"DISTINCT"`, or a boolean where `true` selects the default
/// operator. `false` is rejected outright; callers rely on that raising, so
/// it is not treated as another "no operator" synonym.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionOperator {
    Operator(String),
    Flag(bool),
}

impl From<&str> for UnionOperator {
    fn from(operator: &str) -> Self {
        UnionOperator::Operator(operator.to_owned())
    }
}

impl From<String> for UnionOperator {
    fn from(operator: String) -> Self {
        UnionOperator::Operator(operator)
    }
}

impl From<bool> for UnionOperator {
    fn from(flag: bool) -> Self {
        UnionOperator::Flag(flag)
    }
}

fn normalize_union_operator(operator: UnionOperator) -> Result<String, SqlSessionError> {
    match operator {
        UnionOperator::Operator(op) => {
            let normalized = op.trim().to_uppercase();
            match normalized.as_str() {
                "" | "ALL" | "DISTINCT" => Ok(normalized),
                _ => Err(SqlSessionError::InvalidUnionOperator(op)),
            }
        }
        UnionOperator::Flag(true) => Ok(String::new()),
        UnionOperator::Flag(false) => Err(SqlSessionError::InvalidUnionOperator(
            "FALSE".to_owned(),
        )),
    }
}

/// Single-statement accumulator for SELECT, REPLACE and DELETE queries.
///
/// Clause methods consume and return the builder so statements compose as a
/// chain; terminal methods ([`select_query`](Self::select_query),
/// [`replace_query`](Self::replace_query),
/// [`delete_query`](Self::delete_query)) borrow the accumulated state and
/// can re-render it any number of times. A builder belongs to exactly one
/// in-flight operation; request a fresh one per statement instead of
/// sharing or pooling instances.
///
/// Clause validation failures (malformed location references, rejected
/// union operators) are latched and surfaced by the terminal methods, so a
/// chain never reaches the database with a half-valid statement.
pub struct DmlQueryBuilder<'a> {
    escaper: &'a dyn QueryEscaper,
    select_exprs: Vec<String>,
    from_refs: Vec<String>,
    into_ref: Option<String>,
    where_preds: Vec<String>,
    set_assignments: Vec<(String, String)>,
    lock: Option<String>,
    compounds: Vec<(String, String)>,
    order_exprs: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    error: Option<SqlSessionError>,
}

impl<'a> DmlQueryBuilder<'a> {
    #[must_use]
    pub fn new(escaper: &'a dyn QueryEscaper) -> Self {
        Self {
            escaper,
            select_exprs: Vec::new(),
            from_refs: Vec::new(),
            into_ref: None,
            where_preds: Vec::new(),
            set_assignments: Vec::new(),
            lock: None,
            compounds: Vec::new(),
            order_exprs: Vec::new(),
            limit: None,
            offset: None,
            error: None,
        }
    }

    /// Add an already-escaped expression to the projection list.
    #[must_use]
    pub fn select(mut self, expr: &str) -> Self {
        self.select_exprs.push(expr.to_owned());
        self
    }

    /// Add a FROM target from a raw location reference (`"name"` or
    /// `"name AS alias"`). The name is escaped through the dialect's table
    /// rules; the alias is kept as written.
    #[must_use]
    pub fn from(mut self, raw_ref: &str) -> Self {
        match self.escape_table_reference(raw_ref) {
            Ok(escaped) => self.from_refs.push(escaped),
            Err(e) => self.latch(e),
        }
        self
    }

    /// Set the INTO target for REPLACE statements from a raw location
    /// reference.
    #[must_use]
    pub fn into_table(mut self, raw_ref: &str) -> Self {
        match self.escape_table_reference(raw_ref) {
            Ok(escaped) => self.into_ref = Some(escaped),
            Err(e) => self.latch(e),
        }
        self
    }

    /// Add a WHERE predicate. Predicates are AND-joined in insertion order;
    /// both sides are expected to be escaped already.
    #[must_use]
    pub fn where_clause(mut self, lhs: &str, operator: &str, rhs: &str) -> Self {
        self.where_preds.push(format!("{lhs} {operator} {rhs}"));
        self
    }

    /// Add column assignments for REPLACE, as (escaped column, escaped
    /// value) pairs. Repeated calls accumulate.
    #[must_use]
    pub fn set<I>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.set_assignments.extend(assignments);
        self
    }

    /// Request a row-level lock clause, e.g. `FOR UPDATE`. Rendered at the
    /// end of the statement.
    #[must_use]
    pub fn lock_mode(mut self, mode: &str) -> Self {
        self.lock = Some(mode.to_owned());
        self
    }

    /// Append a compound SELECT member. `true` normalizes to the default
    /// union operator; `false` fails with `InvalidUnionOperator`.
    #[must_use]
    pub fn union<O>(mut self, query: &str, operator: O) -> Self
    where
        O: Into<UnionOperator>,
    {
        match normalize_union_operator(operator.into()) {
            Ok(op) => self.compounds.push((op, query.trim().to_owned())),
            Err(e) => self.latch(e),
        }
        self
    }

    /// Add an ORDER BY expression (already escaped).
    #[must_use]
    pub fn order_by(mut self, expr: &str, ascending: bool) -> Self {
        let direction = if ascending { "ASC" } else { "DESC" };
        self.order_exprs.push(format!("{expr} {direction}"));
        self
    }

    #[must_use]
    pub fn limit(mut self, amount: u64) -> Self {
        self.limit = Some(amount);
        self
    }

    /// Row offset; only rendered together with a limit.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Clear every accumulated clause and any latched error, keeping the
    /// escaper. Reusing a builder across statements requires this explicit
    /// reset; without it the next terminal call re-renders the old clauses.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::new(self.escaper)
    }

    fn escape_table_reference(&self, raw_ref: &str) -> Result<String, SqlSessionError> {
        let location = LocationRef::parse(raw_ref)?;
        let escaped = self.escaper.table(location.name());
        Ok(location.serialize_escaped(&escaped))
    }

    fn latch(&mut self, error: SqlSessionError) {
        // First validation failure wins; later clauses cannot un-poison the
        // statement.
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(super) fn guard(&self) -> Result<(), SqlSessionError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub(super) fn render_where(&self, sql: &mut String) {
        if !self.where_preds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_preds.join(" AND "));
        }
    }

    pub(super) fn render_order_limit(&self, sql: &mut String) {
        if !self.order_exprs.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_exprs.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
    }

    pub(super) fn select_exprs(&self) -> &[String] {
        &self.select_exprs
    }

    pub(super) fn from_refs(&self) -> &[String] {
        &self.from_refs
    }

    pub(super) fn into_ref(&self) -> Option<&str> {
        self.into_ref.as_deref()
    }

    pub(super) fn set_assignments(&self) -> &[(String, String)] {
        &self.set_assignments
    }

    pub(super) fn lock(&self) -> Option<&str> {
        self.lock.as_deref()
    }

    pub(super) fn compounds(&self) -> &[(String, String)] {
        &self.compounds
    }
}
