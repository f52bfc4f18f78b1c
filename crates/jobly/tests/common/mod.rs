//! A `GenericClient` that records statements instead of running them.

#![allow(dead_code)]

use jobly::{GenericClient, JoblyError, JoblyResult};
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub tag: String,
    pub sql: String,
    pub params: Vec<String>,
}

/// Returns no rows for queries and `affected` for statements, or the error
/// built by `fail_with` for every call.
#[derive(Debug, Default)]
pub struct RecordingClient {
    pub affected: u64,
    pub fail_with: Option<fn() -> JoblyError>,
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn affecting(affected: u64) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }

    pub fn failing(fail_with: fn() -> JoblyError) -> Self {
        Self {
            fail_with: Some(fail_with),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, tag: &str, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<()> {
        self.calls.lock().unwrap().push(Recorded {
            tag: tag.to_string(),
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        });
        match self.fail_with {
            Some(fail) => Err(fail()),
            None => Ok(()),
        }
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.query_tagged("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.record(tag, sql, params)?;
        Ok(Vec::new())
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
        self.record(tag, sql, params)?;
        Ok(self.affected)
    }
}
