//! Jobs posted by companies.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::JobSearch;
use crate::param::Param;
use crate::partial_update::{Field, FieldMap, Patch, change};
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

pub(crate) const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Updatable job fields. `salary` and `equity` use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::partial_update::nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::partial_update::nullable")]
    pub equity: Option<Option<Decimal>>,
    pub company_handle: Option<String>,
}

const JOB_FIELDS: &[Field] = &[
    Field::passthrough("title"),
    Field::passthrough("salary"),
    Field::passthrough("equity"),
    Field::renamed("companyHandle", "company_handle"),
];

impl Patch for JobPatch {
    const FIELDS: FieldMap = FieldMap::new(JOB_FIELDS);

    fn changes(&self) -> Vec<(&'static str, Param)> {
        [
            change("title", &self.title),
            change("salary", &self.salary),
            change("equity", &self.equity),
            change("companyHandle", &self.company_handle),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn no_job(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}

/// Create a job and return it with its generated id.
pub async fn create(conn: &impl GenericClient, job: &NewJob) -> JoblyResult<Job> {
    let query = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
    );
    let params: [&(dyn ToSql + Sync); 4] =
        [&job.title, &job.salary, &job.equity, &job.company_handle];
    let row = conn
        .query_one_tagged("job.create", &query, &params)
        .await
        .map_err(|e| match e {
            JoblyError::ForeignKeyViolation(_) => {
                JoblyError::bad_request(format!("No company: {}", job.company_handle))
            }
            other => other,
        })?;
    Job::from_row(&row)
}

/// Find jobs matching `search`, ordered by title.
pub async fn find_all(conn: &impl GenericClient, search: &JobSearch) -> JoblyResult<Vec<Job>> {
    let clause = search.where_clause()?;
    let mut q = sql(format!("SELECT {JOB_COLUMNS} FROM jobs"));
    if !clause.is_empty() {
        q.push(" ");
        q.push_sql(clause);
    }
    q.push(" ORDER BY title, id");
    q.fetch_all_as(conn, "job.find_all").await
}

/// Jobs posted by one company, ordered by id.
pub async fn find_by_company(conn: &impl GenericClient, handle: &str) -> JoblyResult<Vec<Job>> {
    let mut q = sql(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = "));
    q.push_bind(handle.to_string()).push(" ORDER BY id");
    q.fetch_all_as(conn, "job.find_by_company").await
}

pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
    let mut q = sql(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = "));
    q.push_bind(id);
    q.fetch_opt_as(conn, "job.get").await?.ok_or_else(|| no_job(id))
}

/// Apply a partial update; only the fields present in `patch` change.
pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
    let set = patch.set_clause()?;
    let query = format!(
        "UPDATE jobs SET {} WHERE id = {} RETURNING {JOB_COLUMNS}",
        set.set_cols,
        set.next_placeholder()
    );
    let mut params = set.params_ref();
    params.push(&id);

    let row = conn
        .query_opt_tagged("job.update", &query, &params)
        .await?
        .ok_or_else(|| no_job(id))?;
    Job::from_row(&row)
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
    let mut q = sql("DELETE FROM jobs WHERE id = ");
    q.push_bind(id);
    match q.execute(conn, "job.remove").await? {
        0 => Err(no_job(id)),
        _ => Ok(()),
    }
}
