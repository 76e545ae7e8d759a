use crate::error::SqlSessionError;

use super::DmlQueryBuilder;

impl DmlQueryBuilder<'_> {
    /// Render the accumulated clauses as a SELECT statement.
    ///
    /// Clause order is fixed: projection, FROM, WHERE, compound members,
    /// ORDER BY, LIMIT/OFFSET, lock mode. An empty projection list renders
    /// as `*`.
    ///
    /// # Errors
    /// Returns the first latched clause validation error, or
    /// `SqlSessionError::InvalidLocationReference` if no FROM target was
    /// added.
    pub fn select_query(&self) -> Result<String, SqlSessionError> {
        self.guard()?;
        if self.from_refs().is_empty() {
            return Err(SqlSessionError::InvalidLocationReference(
                "SELECT query without FROM target".to_owned(),
            ));
        }

        let mut sql = String::from("SELECT ");
        if self.select_exprs().is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_exprs().join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.from_refs().join(", "));
        self.render_where(&mut sql);
        for (operator, query) in self.compounds() {
            sql.push_str(" UNION");
            if !operator.is_empty() {
                sql.push(' ');
                sql.push_str(operator);
            }
            sql.push_str(" (");
            sql.push_str(query);
            sql.push(')');
        }
        self.render_order_limit(&mut sql);
        if let Some(mode) = self.lock() {
            sql.push(' ');
            sql.push_str(mode);
        }

        Ok(sql)
    }
}
