//! Connection pool utilities

use crate::config::ConfigFile;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a database URL.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool("postgresql:///jobly", 16)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(database_url: &str, max_size: usize) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
    let pool = Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))?;

    tracing::info!(target: "jobly", max_size, "database pool created");
    Ok(pool)
}

/// Create a connection pool for the environment selected in `config`.
pub fn create_pool_from_config(config: &ConfigFile) -> JoblyResult<Pool> {
    create_pool(config.database_url(), config.database.pool_size)
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
