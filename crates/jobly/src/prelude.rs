//! Convenient imports for typical `jobly` usage.
//!
//! ```ignore
//! use jobly::prelude::*;
//! ```

pub use crate::{
    AuthUser, CompanySearch, FromRow, GenericClient, JobSearch, JoblyError, JoblyResult, Patch,
    RowExt, Sql, TracingClient, sql,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_from_config};
