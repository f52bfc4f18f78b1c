//! Database configuration.
//!
//! Settings come from a `jobly.toml` file or from the environment (with an
//! optional `.env` file loaded through `dotenvy`). String values in the file
//! may reference environment variables as `${VAR}`.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! test_url = "postgresql:///jobly_test"
//! pool_size = 16
//! ```

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_URL: &str = "postgresql:///jobly";
const DEFAULT_TEST_URL: &str = "postgresql:///jobly_test";
const DEFAULT_POOL_SIZE: usize = 16;

/// Which database the process should talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Test,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_test_url")]
    pub test_url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_test_url() -> String {
    DEFAULT_TEST_URL.to_string()
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            test_url: default_test_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl ConfigFile {
    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    /// Parse and validate TOML config text.
    pub fn parse(raw: &str) -> JoblyResult<Self> {
        let mut file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    /// Build the config from environment variables, loading `.env` if present.
    ///
    /// - `DATABASE_URL`, `JOBLY_TEST_DATABASE_URL`
    /// - `JOBLY_POOL_SIZE`
    /// - `JOBLY_ENV=test` selects the test database
    pub fn from_env() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();

        let mut database = DatabaseConfig::default();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            database.url = url;
        }
        if let Ok(url) = std::env::var("JOBLY_TEST_DATABASE_URL") {
            database.test_url = url;
        }
        if let Ok(size) = std::env::var("JOBLY_POOL_SIZE") {
            database.pool_size = size.parse().map_err(|_| {
                JoblyError::Config(format!("JOBLY_POOL_SIZE is not a number: {size}"))
            })?;
        }
        let environment = match std::env::var("JOBLY_ENV").as_deref() {
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        let file = Self {
            environment,
            database,
        };
        file.validate()?;
        Ok(file)
    }

    /// The database URL for the selected environment.
    pub fn database_url(&self) -> &str {
        match self.environment {
            Environment::Development => &self.database.url,
            Environment::Test => &self.database.test_url,
        }
    }

    fn expand_env(&mut self) -> JoblyResult<()> {
        self.database.url = expand_env_vars(&self.database.url)?;
        self.database.test_url = expand_env_vars(&self.database.test_url)?;
        Ok(())
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database_url().trim().is_empty() {
            return Err(JoblyError::Config("database url must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(JoblyError::Config("database.pool_size must be > 0".into()));
        }
        Ok(())
    }
}

/// Replace `${VAR}` references with their environment values.
fn expand_env_vars(input: &str) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(JoblyError::Config(format!("unterminated ${{ in '{input}'")));
        };
        let name = &after[..end];
        let value = std::env::var(name)
            .map_err(|_| JoblyError::Config(format!("environment variable {name} is not set")))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
