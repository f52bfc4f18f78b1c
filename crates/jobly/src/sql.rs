//! SQL-first dynamic builder.
//!
//! `Sql` lets the model layer compose statements from fixed SQL text and bound
//! values without tracking placeholder indices by hand.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT handle, name FROM companies");
//! q.push_sql(search.where_clause()?);
//! q.push(" ORDER BY name");
//!
//! let companies: Vec<Company> = q.fetch_all_as(&conn, "company.find_all").await?;
//! ```

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::param::Param;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
/// placeholders in the final SQL string.
#[derive(Debug)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Param>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
            && self
                .parts
                .iter()
                .all(|p| matches!(p, SqlPart::Raw(s) if s.is_empty()))
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_param(Param::new(value))
    }

    /// Append a placeholder for an already wrapped parameter.
    pub fn push_param(&mut self, param: Param) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(param);
        self
    }

    /// Append another `Sql` fragment, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    use std::fmt::Write;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Bound parameters in placeholder order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_sql).collect()
    }

    fn validate(&self) -> JoblyResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            return Err(JoblyError::bad_request(format!(
                "Sql: placeholders({}) do not match params({})",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }

    /// Execute the built SQL and return all rows, tagged for logging.
    pub async fn fetch_all_tagged(
        &self,
        conn: &impl GenericClient,
        tag: &str,
    ) -> JoblyResult<Vec<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_tagged(tag, &sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
        tag: &str,
    ) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all_tagged(conn, tag).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
        tag: &str,
    ) -> JoblyResult<Option<T>> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        let row = conn.query_opt_tagged(tag, &sql, &params).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient, tag: &str) -> JoblyResult<u64> {
        self.validate()?;
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.execute_tagged(tag, &sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM jobs WHERE salary >= ");
        q.push_bind(1_i32).push(" AND title = ").push_bind("x");

        assert_eq!(q.to_sql(), "SELECT * FROM jobs WHERE salary >= $1 AND title = $2");
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push(" WHERE handle = ").push_bind("c1");

        let mut q = sql("SELECT * FROM companies");
        q.push_sql(w);

        assert_eq!(q.to_sql(), "SELECT * FROM companies WHERE handle = $1");
        assert_eq!(q.params_ref().len(), 1);
    }

    #[test]
    fn empty_detects_untouched_builders() {
        assert!(Sql::empty().is_empty());
        assert!(sql("").is_empty());
        assert!(!sql("SELECT 1").is_empty());
    }

    #[test]
    fn composed_fragment_renumbers_placeholders() {
        let mut q = sql("UPDATE jobs SET title = ");
        q.push_bind("t");
        let mut w = Sql::empty();
        w.push(" WHERE id = ").push_bind(7_i32);
        q.push_sql(w);

        assert_eq!(q.to_sql(), "UPDATE jobs SET title = $1 WHERE id = $2");
        assert!(q.validate().is_ok());
    }
}
