//! Companies and their search.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::CompanySearch;
use crate::models::job::{self, Job};
use crate::param::Param;
use crate::partial_update::{Field, FieldMap, Patch, change};
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with the jobs it has posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Updatable company fields. The handle is the key and cannot change.
///
/// Nullable columns use `Some(None)` to clear the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::partial_update::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::partial_update::nullable")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::partial_update::nullable")]
    pub logo_url: Option<Option<String>>,
}

const COMPANY_FIELDS: &[Field] = &[
    Field::passthrough("name"),
    Field::passthrough("description"),
    Field::renamed("numEmployees", "num_employees"),
    Field::renamed("logoUrl", "logo_url"),
];

impl Patch for CompanyPatch {
    const FIELDS: FieldMap = FieldMap::new(COMPANY_FIELDS);

    fn changes(&self) -> Vec<(&'static str, Param)> {
        [
            change("name", &self.name),
            change("description", &self.description),
            change("numEmployees", &self.num_employees),
            change("logoUrl", &self.logo_url),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn no_company(handle: &str) -> JoblyError {
    JoblyError::not_found(format!("No company: {handle}"))
}

/// Create a company. A taken handle is a bad request.
pub async fn create(conn: &impl GenericClient, company: &NewCompany) -> JoblyResult<Company> {
    let query = format!(
        "INSERT INTO companies ({COMPANY_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
    );
    let params: [&(dyn ToSql + Sync); 5] = [
        &company.handle,
        &company.name,
        &company.description,
        &company.num_employees,
        &company.logo_url,
    ];
    let row = conn
        .query_one_tagged("company.create", &query, &params)
        .await
        .map_err(|e| match e {
            JoblyError::UniqueViolation(_) => {
                JoblyError::bad_request(format!("Duplicate company: {}", company.handle))
            }
            other => other,
        })?;
    Company::from_row(&row)
}

/// Find companies matching `search`, ordered by name.
pub async fn find_all(
    conn: &impl GenericClient,
    search: &CompanySearch,
) -> JoblyResult<Vec<Company>> {
    let clause = search.where_clause()?;
    let mut q = sql(format!("SELECT {COMPANY_COLUMNS} FROM companies"));
    if !clause.is_empty() {
        q.push(" ");
        q.push_sql(clause);
    }
    q.push(" ORDER BY name");
    q.fetch_all_as(conn, "company.find_all").await
}

/// A company and its jobs.
pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
    let mut q = sql(format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = "));
    q.push_bind(handle.to_string());
    let company: Company = q
        .fetch_opt_as(conn, "company.get")
        .await?
        .ok_or_else(|| no_company(handle))?;

    let jobs = job::find_by_company(conn, handle).await?;
    Ok(CompanyDetail { company, jobs })
}

/// Apply a partial update; only the fields present in `patch` change.
pub async fn update(
    conn: &impl GenericClient,
    handle: &str,
    patch: &CompanyPatch,
) -> JoblyResult<Company> {
    let set = patch.set_clause()?;
    let query = format!(
        "UPDATE companies SET {} WHERE handle = {} RETURNING {COMPANY_COLUMNS}",
        set.set_cols,
        set.next_placeholder()
    );
    let mut params = set.params_ref();
    params.push(&handle);

    let row = conn
        .query_opt_tagged("company.update", &query, &params)
        .await?
        .ok_or_else(|| no_company(handle))?;
    Company::from_row(&row)
}

pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
    let mut q = sql("DELETE FROM companies WHERE handle = ");
    q.push_bind(handle.to_string());
    match q.execute(conn, "company.remove").await? {
        0 => Err(no_company(handle)),
        _ => Ok(()),
    }
}
