//! `WHERE` clause builders for company and job search.
//!
//! Search criteria arrive as raw query-string values. Each builder validates
//! them, then renders a fixed, ordered list of predicates; every client value
//! is a bound parameter.

use crate::error::{JoblyError, JoblyResult};
use crate::param::Param;
use crate::sql::Sql;
use serde::Deserialize;

/// One predicate: SQL text with at most one trailing bound value.
#[derive(Debug, Clone)]
struct Predicate {
    sql: &'static str,
    value: Option<Param>,
}

/// An ordered conjunction of predicates.
///
/// Predicates render in the order they were added, joined by ` AND `. With no
/// predicates the clause renders to nothing rather than a dangling `WHERE`.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `<sql><placeholder>`, e.g. `and_bind("salary >= ", 1000)`.
    pub fn and_bind(&mut self, sql: &'static str, value: Param) -> &mut Self {
        self.predicates.push(Predicate {
            sql,
            value: Some(value),
        });
        self
    }

    /// Add a predicate with no client-supplied value.
    pub fn and_literal(&mut self, sql: &'static str) -> &mut Self {
        self.predicates.push(Predicate { sql, value: None });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render as `WHERE p1 AND p2 ...`.
    pub fn into_sql(self) -> Sql {
        let mut out = Sql::empty();
        for (i, predicate) in self.predicates.into_iter().enumerate() {
            out.push(if i == 0 { "WHERE " } else { " AND " });
            out.push(predicate.sql);
            if let Some(value) = predicate.value {
                out.push_param(value);
            }
        }
        out
    }
}

/// Escape LIKE wildcards so the client value matches as a literal substring.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// A criterion is present when it was supplied and is not empty.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_number(field: &str, raw: &str) -> JoblyResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| JoblyError::bad_request(format!("{field} must be a number")))
}

fn unrecognized(key: &str) -> JoblyError {
    JoblyError::bad_request(format!("{key} not recognized as appropriate filter parameter"))
}

/// Company search criteria, as received from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanySearch {
    pub name: Option<String>,
    pub min_employees: Option<String>,
    pub max_employees: Option<String>,
}

impl CompanySearch {
    /// Collect criteria from query-string pairs, rejecting unknown keys.
    pub fn from_query<'a, I>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut search = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                "name" => &mut search.name,
                "minEmployees" => &mut search.min_employees,
                "maxEmployees" => &mut search.max_employees,
                other => return Err(unrecognized(other)),
            };
            *slot = Some(value.to_string());
        }
        Ok(search)
    }

    pub fn is_empty(&self) -> bool {
        present(&self.name).is_none()
            && present(&self.min_employees).is_none()
            && present(&self.max_employees).is_none()
    }

    /// Validate the criteria and render the `WHERE` clause.
    ///
    /// Order is fixed: name, minEmployees, maxEmployees.
    pub fn where_clause(&self) -> JoblyResult<Sql> {
        let min = present(&self.min_employees)
            .map(|raw| parse_number("minEmployees", raw))
            .transpose()?;
        let max = present(&self.max_employees)
            .map(|raw| parse_number("maxEmployees", raw))
            .transpose()?;

        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(JoblyError::bad_request("minEmployees cannot be greater than maxEmployees"));
        }

        let mut clause = WhereClause::new();
        if let Some(name) = present(&self.name) {
            clause.and_bind("name LIKE ", Param::new(contains_pattern(name)));
        }
        if let Some(min) = min {
            clause.and_bind("num_employees >= ", Param::new(min));
        }
        if let Some(max) = max {
            clause.and_bind("num_employees <= ", Param::new(max));
        }
        Ok(clause.into_sql())
    }
}

/// Job search criteria, as received from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobSearch {
    pub title: Option<String>,
    pub min_salary: Option<String>,
    pub has_equity: Option<String>,
}

impl JobSearch {
    /// Collect criteria from query-string pairs, rejecting unknown keys.
    pub fn from_query<'a, I>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut search = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                "title" => &mut search.title,
                "minSalary" => &mut search.min_salary,
                "hasEquity" => &mut search.has_equity,
                other => return Err(unrecognized(other)),
            };
            *slot = Some(value.to_string());
        }
        Ok(search)
    }

    pub fn is_empty(&self) -> bool {
        present(&self.title).is_none()
            && present(&self.min_salary).is_none()
            && present(&self.has_equity).is_none()
    }

    /// Validate the criteria and render the `WHERE` clause.
    ///
    /// Order is fixed: title, minSalary, hasEquity. `hasEquity=false` is
    /// accepted but adds no predicate.
    pub fn where_clause(&self) -> JoblyResult<Sql> {
        let min_salary = present(&self.min_salary)
            .map(|raw| parse_number("minSalary", raw))
            .transpose()?;
        let has_equity = match present(&self.has_equity) {
            None | Some("false") => false,
            Some("true") => true,
            Some(_) => {
                return Err(JoblyError::bad_request("hasEquity must be a either true or false"));
            }
        };

        let mut clause = WhereClause::new();
        if let Some(title) = present(&self.title) {
            clause.and_bind("title LIKE ", Param::new(contains_pattern(title)));
        }
        if let Some(min_salary) = min_salary {
            clause.and_bind("salary >= ", Param::new(min_salary));
        }
        if has_equity {
            clause.and_literal("equity > 0");
        }
        Ok(clause.into_sql())
    }
}
