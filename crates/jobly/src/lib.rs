//! # jobly
//!
//! Data access for a job board: companies, jobs and users on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: typed patches render a `SET` fragment through a closed
//!   field map; unknown fields are rejected, never trusted as column names
//! - **Search filters**: company and job criteria are validated and rendered as
//!   `WHERE` clauses with every client value bound as a parameter
//! - **Transaction-friendly**: model functions take any `GenericClient`
//! - **Logging**: wrap a client in `TracingClient` to log every statement
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{CompanySearch, TracingClient, models::company};
//!
//! let pool = jobly::create_pool_from_config(&jobly::ConfigFile::from_env()?)?;
//! let conn = TracingClient::new(pool.get().await?);
//!
//! let search = CompanySearch::from_query([("name", "acme"), ("minEmployees", "10")])?;
//! let companies = company::find_all(&conn, &search).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod monitor;
pub mod param;
pub mod partial_update;
pub mod prelude;
pub mod row;
pub mod sql;

pub use auth::{AuthUser, ensure_admin, ensure_admin_or_self, ensure_self};
pub use client::GenericClient;
pub use config::{ConfigFile, DatabaseConfig, Environment};
pub use error::{JoblyError, JoblyResult};
pub use filter::{CompanySearch, JobSearch, WhereClause};
pub use monitor::{TracingClient, TracingConfig};
pub use param::Param;
pub use partial_update::{Field, FieldMap, Patch, SetClause, sql_for_partial_update};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config};
