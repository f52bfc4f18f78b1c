//! Users and their job applications.
//!
//! Passwords are hashed and verified outside this crate: `register` and
//! `update` store whatever hash they are given, and `find_credentials` hands
//! the stored hash back to the authenticator.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::param::Param;
use crate::partial_update::{Field, FieldMap, Patch, change};
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// A user and the ids of the jobs they applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithJobs {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

/// A user with the stored password hash, for the external authenticator.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Updatable user fields. `password` must already be hashed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

const USER_FIELDS: &[Field] = &[
    Field::renamed("firstName", "first_name"),
    Field::renamed("lastName", "last_name"),
    Field::passthrough("password"),
    Field::passthrough("email"),
    Field::renamed("isAdmin", "is_admin"),
];

impl Patch for UserPatch {
    const FIELDS: FieldMap = FieldMap::new(USER_FIELDS);

    fn changes(&self) -> Vec<(&'static str, Param)> {
        [
            change("firstName", &self.first_name),
            change("lastName", &self.last_name),
            change("password", &self.password),
            change("email", &self.email),
            change("isAdmin", &self.is_admin),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn no_user(username: &str) -> JoblyError {
    JoblyError::not_found(format!("No user: {username}"))
}

/// Group `(username, job_id)` application rows by user.
///
/// Job ids keep their input order within each user.
pub fn group_job_ids<I>(applications: I) -> BTreeMap<String, Vec<i32>>
where
    I: IntoIterator<Item = (String, i32)>,
{
    let mut grouped: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    for (username, job_id) in applications {
        grouped.entry(username).or_default().push(job_id);
    }
    grouped
}

/// Register a user. A taken username is a bad request.
pub async fn register(conn: &impl GenericClient, user: &NewUser) -> JoblyResult<User> {
    let query = format!(
        "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
    );
    let params: [&(dyn ToSql + Sync); 6] = [
        &user.username,
        &user.password_hash,
        &user.first_name,
        &user.last_name,
        &user.email,
        &user.is_admin,
    ];
    let row = conn
        .query_one_tagged("user.register", &query, &params)
        .await
        .map_err(|e| match e {
            JoblyError::UniqueViolation(_) => {
                JoblyError::bad_request(format!("Duplicate username: {}", user.username))
            }
            other => other,
        })?;

    tracing::info!(target: "jobly", username = %user.username, "registered user");
    User::from_row(&row)
}

/// Look up a user and their password hash for login.
///
/// An unknown username is reported the same way a wrong password would be.
pub async fn find_credentials(
    conn: &impl GenericClient,
    username: &str,
) -> JoblyResult<UserCredentials> {
    let query = format!("SELECT {USER_COLUMNS}, password FROM users WHERE username = $1");
    let row = conn
        .query_opt_tagged("user.find_credentials", &query, &[&username])
        .await?
        .ok_or_else(|| JoblyError::unauthorized("Invalid username/password"))?;

    Ok(UserCredentials {
        user: User::from_row(&row)?,
        password_hash: row.try_get_column("password")?,
    })
}

/// All users with their applied job ids, ordered by username.
pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<UserWithJobs>> {
    let users: Vec<User> = sql(format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
        .fetch_all_as(conn, "user.find_all")
        .await?;

    let rows = conn
        .query_tagged(
            "user.find_all.applications",
            "SELECT username, job_id FROM applications ORDER BY username, job_id",
            &[],
        )
        .await?;
    let applications = rows
        .iter()
        .map(|row| -> JoblyResult<(String, i32)> {
            Ok((row.try_get_column("username")?, row.try_get_column("job_id")?))
        })
        .collect::<JoblyResult<Vec<_>>>()?;
    let mut jobs_by_user = group_job_ids(applications);

    Ok(users
        .into_iter()
        .map(|user| {
            let jobs = jobs_by_user.remove(&user.username).unwrap_or_default();
            UserWithJobs { user, jobs }
        })
        .collect())
}

/// One user with their applied job ids.
pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<UserWithJobs> {
    let mut q = sql(format!("SELECT {USER_COLUMNS} FROM users WHERE username = "));
    q.push_bind(username.to_string());
    let user: User = q
        .fetch_opt_as(conn, "user.get")
        .await?
        .ok_or_else(|| no_user(username))?;

    let rows = conn
        .query_tagged(
            "user.get.applications",
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
            &[&username],
        )
        .await?;
    let jobs = rows
        .iter()
        .map(|row| row.try_get_column("job_id"))
        .collect::<JoblyResult<Vec<i32>>>()?;

    Ok(UserWithJobs { user, jobs })
}

/// Apply a partial update.
///
/// This can set a new password or grant admin rights; callers must have
/// authorized the change before calling it.
pub async fn update(
    conn: &impl GenericClient,
    username: &str,
    patch: &UserPatch,
) -> JoblyResult<User> {
    let set = patch.set_clause()?;
    let query = format!(
        "UPDATE users SET {} WHERE username = {} RETURNING {USER_COLUMNS}",
        set.set_cols,
        set.next_placeholder()
    );
    let mut params = set.params_ref();
    params.push(&username);

    let row = conn
        .query_opt_tagged("user.update", &query, &params)
        .await?
        .ok_or_else(|| no_user(username))?;
    User::from_row(&row)
}

pub async fn remove(conn: &impl GenericClient, username: &str) -> JoblyResult<()> {
    let mut q = sql("DELETE FROM users WHERE username = ");
    q.push_bind(username.to_string());
    match q.execute(conn, "user.remove").await? {
        0 => Err(no_user(username)),
        _ => Ok(()),
    }
}

/// Record that `username` applied to `job_id`; returns the job id.
pub async fn apply(conn: &impl GenericClient, username: &str, job_id: i32) -> JoblyResult<i32> {
    let row = conn
        .query_one_tagged(
            "user.apply",
            "INSERT INTO applications (username, job_id) VALUES ($1, $2) RETURNING job_id",
            &[&username, &job_id],
        )
        .await
        .map_err(|e| match e {
            JoblyError::ForeignKeyViolation(_) => {
                JoblyError::not_found(format!("No user or job: {username}, {job_id}"))
            }
            JoblyError::UniqueViolation(_) => {
                JoblyError::bad_request(format!("Already applied to job: {job_id}"))
            }
            other => other,
        })?;
    row.try_get_column("job_id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_applications_per_user() {
        let grouped = group_job_ids(vec![
            ("u1".to_string(), 3),
            ("u2".to_string(), 1),
            ("u1".to_string(), 7),
        ]);
        assert_eq!(grouped["u1"], vec![3, 7]);
        assert_eq!(grouped["u2"], vec![1]);
        assert!(!grouped.contains_key("u3"));
    }

    #[test]
    fn patch_follows_declaration_order() {
        let patch = UserPatch {
            is_admin: Some(true),
            first_name: Some("Aliya".into()),
            ..Default::default()
        };
        let set = patch.set_clause().unwrap();
        assert_eq!(set.set_cols, r#""first_name"=$1, "is_admin"=$2"#);
        let values: Vec<String> = set.values.iter().map(|v| format!("{v:?}")).collect();
        assert_eq!(values, vec![r#""Aliya""#, "true"]);
    }

    #[test]
    fn new_user_rejects_unknown_keys() {
        let parsed: Result<NewUser, _> = serde_json::from_str(
            r#"{"username": "u1", "passwordHash": "h", "firstName": "F", "lastName": "L",
                "email": "u1@email.com", "role": "admin"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn patch_rejects_username_changes() {
        let parsed: Result<UserPatch, _> = serde_json::from_str(r#"{"username": "other"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn user_with_jobs_serializes_flat() {
        let user = UserWithJobs {
            user: User {
                username: "u1".into(),
                first_name: "U1F".into(),
                last_name: "U1L".into(),
                email: "u1@email.com".into(),
                is_admin: false,
            },
            jobs: vec![1, 2],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "U1F");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["jobs"], serde_json::json!([1, 2]));
    }
}
