//! `SET` clause generation for partial updates.
//!
//! A partial update only touches the columns present in the request. The
//! client-facing field names are resolved through a closed [`FieldMap`]; a
//! field that is not declared there is rejected, never passed through as a
//! column name.
//!
//! # Example
//!
//! ```ignore
//! use jobly::partial_update::{Field, FieldMap, sql_for_partial_update};
//! use jobly::Param;
//!
//! const USER_FIELDS: &[Field] = &[
//!     Field::renamed("firstName", "first_name"),
//!     Field::passthrough("age"),
//! ];
//!
//! let set = sql_for_partial_update(
//!     [("firstName", Param::new("Aliya")), ("age", Param::new(32_i32))],
//!     &FieldMap::new(USER_FIELDS),
//! )?;
//! assert_eq!(set.set_cols, r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::param::Param;
use serde::{Deserialize, Deserializer};
use std::fmt::Write;
use tokio_postgres::types::ToSql;

/// One updatable field: its client-facing name and its storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
}

impl Field {
    /// A field stored under a different column name (`firstName` -> `first_name`).
    pub const fn renamed(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }

    /// A field stored under its own name.
    pub const fn passthrough(name: &'static str) -> Self {
        Self { name, column: name }
    }
}

/// The closed set of fields an entity accepts in a partial update.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    fields: &'static [Field],
}

impl FieldMap {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Resolve a client-facing field to its column.
    pub fn column(&self, name: &str) -> JoblyResult<&'static str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.column)
            .ok_or_else(|| JoblyError::bad_request(format!("Unknown field: {name}")))
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }
}

/// The rendered `SET` fragment and its values.
///
/// Placeholder `$i` in `set_cols` corresponds to `values[i - 1]`.
#[derive(Debug, Clone)]
pub struct SetClause {
    pub set_cols: String,
    pub values: Vec<Param>,
}

impl SetClause {
    /// Placeholder for the first parameter the caller appends after the values,
    /// typically the key in `WHERE`.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(Param::as_sql).collect()
    }
}

/// Build the `SET` fragment for an UPDATE from an ordered set of changes.
///
/// Columns are quoted and numbered `$1..$k` in input order. An empty change set
/// is an error, not a no-op.
pub fn sql_for_partial_update<'a, I>(changes: I, fields: &FieldMap) -> JoblyResult<SetClause>
where
    I: IntoIterator<Item = (&'a str, Param)>,
{
    let mut set_cols = String::new();
    let mut values = Vec::new();
    let mut seen: Vec<&'static str> = Vec::new();

    for (name, value) in changes {
        let column = fields.column(name)?;
        if seen.contains(&column) {
            return Err(JoblyError::bad_request(format!("Duplicate field: {name}")));
        }
        seen.push(column);

        values.push(value);
        if values.len() > 1 {
            set_cols.push_str(", ");
        }
        let _ = write!(&mut set_cols, "\"{}\"=${}", column, values.len());
    }

    if values.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    Ok(SetClause { set_cols, values })
}

/// Pair a present optional field with its name; `None` means "leave untouched".
///
/// For a nullable column declare the field as `Option<Option<T>>`: `Some(None)`
/// binds SQL `NULL`.
pub fn change<T>(name: &'static str, value: &Option<T>) -> Option<(&'static str, Param)>
where
    T: ToSql + Clone + Send + Sync + 'static,
{
    value.as_ref().map(|v| (name, Param::new(v.clone())))
}

/// Deserialize a nullable patch field, keeping JSON `null` apart from absence.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: an absent key
/// stays `None`, `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

/// A typed partial update for one entity.
///
/// Implementors are structs of optional fields; `changes` yields the present
/// ones in declaration order.
pub trait Patch {
    /// Fields this entity accepts.
    const FIELDS: FieldMap;

    /// Present fields as `(client-facing name, value)` pairs.
    fn changes(&self) -> Vec<(&'static str, Param)>;

    /// Render the `SET` fragment for this patch.
    fn set_clause(&self) -> JoblyResult<SetClause> {
        sql_for_partial_update(self.changes(), &Self::FIELDS)
    }
}
