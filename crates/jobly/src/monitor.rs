//! SQL logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on the `jobly.sql` target. Model functions tag every statement
//! (`company.update`, `user.apply`, ...) so the tag shows up in the event.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Settings for [`TracingClient`].
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for successful statements.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: Some(Duration::from_millis(500)),
        }
    }
}

/// A client wrapper that logs every statement it executes.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    config: TracingConfig,
}

impl<C: GenericClient> TracingClient<C> {
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, TracingConfig::default())
    }

    pub fn with_config(inner: C, config: TracingConfig) -> Self {
        Self { inner, config }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }

    fn record<T>(
        &self,
        tag: &str,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &JoblyResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.display_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match result {
            Ok(value) => {
                let slow = self
                    .config
                    .slow_query_threshold
                    .is_some_and(|threshold| elapsed > threshold);
                let level = if slow { Level::WARN } else { self.config.level };
                emit_at_level!(
                    level,
                    target: "jobly.sql",
                    tag,
                    param_count,
                    rows = rows(value),
                    elapsed_ms,
                    slow,
                    sql = %sql,
                );
            }
            Err(err) => tracing::warn!(
                target: "jobly.sql",
                tag,
                param_count,
                elapsed_ms,
                error = %err,
                sql = %sql,
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.query_tagged("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query_tagged(tag, sql, params).await;
        self.record(tag, sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.execute_tagged("-", sql, params).await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.inner.execute_tagged(tag, sql, params).await;
        self.record(tag, sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }
}
