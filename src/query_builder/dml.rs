use crate::error::SqlSessionError;

use super::DmlQueryBuilder;

impl DmlQueryBuilder<'_> {
    /// Render the accumulated clauses as a REPLACE statement:
    /// `REPLACE INTO target SET col = val, ...`. Replace semantics swap the
    /// whole row, which is what keeps session writes free of merge logic.
    ///
    /// # Errors
    /// Returns the first latched clause validation error,
    /// `SqlSessionError::InvalidLocationReference` if no INTO target was
    /// set, or `SqlSessionError::InvalidArgument` without SET assignments.
    pub fn replace_query(&self) -> Result<String, SqlSessionError> {
        self.guard()?;
        let target = self.into_ref().ok_or_else(|| {
            SqlSessionError::InvalidLocationReference(
                "REPLACE query without INTO target".to_owned(),
            )
        })?;
        if self.set_assignments().is_empty() {
            return Err(SqlSessionError::InvalidArgument(
                "REPLACE query without SET assignments".to_owned(),
            ));
        }

        let assignments = self
            .set_assignments()
            .iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("REPLACE INTO {target} SET {assignments}"))
    }

    /// Render the accumulated clauses as a DELETE statement:
    /// `DELETE FROM target WHERE ... [ORDER BY/LIMIT] [lock mode]`.
    ///
    /// # Errors
    /// Returns the first latched clause validation error, or
    /// `SqlSessionError::InvalidLocationReference` if no FROM target was
    /// added.
    pub fn delete_query(&self) -> Result<String, SqlSessionError> {
        self.guard()?;
        if self.from_refs().is_empty() {
            return Err(SqlSessionError::InvalidLocationReference(
                "DELETE query without FROM target".to_owned(),
            ));
        }

        let mut sql = String::from("DELETE FROM ");
        sql.push_str(&self.from_refs().join(", "));
        self.render_where(&mut sql);
        self.render_order_limit(&mut sql);
        if let Some(mode) = self.lock() {
            sql.push(' ');
            sql.push_str(mode);
        }

        Ok(sql)
    }
}
