//! Runner configuration
//!
//! Every setting has a built-in default, so an empty TOML file (or no file
//! at all) reproduces the stock run: ten monotonic queries against the `foo`
//! collection on `localhost:6745`.
//!
//! ```toml
//! hosts = ["db1:6745", "db2:6745"]
//! database = "fanquery_example"
//! collection = "foo"
//! timeout_secs = 60
//! concurrency = 10
//! mode = "monotonic"
//! ```

use std::path::Path;
use std::time::Duration;

use fanquery_client::{ConsistencyMode, DialInfo, DEFAULT_POOL_LIMIT};
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Server addresses as `host:port`
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// How long the initial dial may keep trying
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of concurrent queries
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_pool_limit")]
    pub pool_limit: usize,
    #[serde(default)]
    pub mode: ConsistencyMode,
    /// Extra attempts after a failed query; 0 logs and gives up
    #[serde(default)]
    pub query_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_hosts() -> Vec<String> {
    vec!["localhost:6745".to_string()]
}

fn default_database() -> String {
    "fanquery_example".to_string()
}

fn default_collection() -> String {
    "foo".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrency() -> usize {
    10
}

fn default_pool_limit() -> usize {
    DEFAULT_POOL_LIMIT
}

fn default_retry_backoff_ms() -> u64 {
    100
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            database: default_database(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            pool_limit: default_pool_limit(),
            mode: ConsistencyMode::default(),
            query_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            username: None,
            password: None,
        }
    }
}

impl RunnerConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunnerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if self.hosts.is_empty() {
            return Err(RunnerError::Config("at least one host is required".to_string()));
        }
        if let Some(host) = self.hosts.iter().find(|h| !h.contains(':')) {
            return Err(RunnerError::Config(format!(
                "host '{}' must be in host:port form",
                host
            )));
        }
        if self.database.is_empty() || self.collection.is_empty() {
            return Err(RunnerError::Config(
                "database and collection must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(RunnerError::Config("timeout_secs must be positive".to_string()));
        }
        if self.pool_limit == 0 {
            return Err(RunnerError::Config("pool_limit must be positive".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(RunnerError::Config(
                "username and password must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Dial parameters for the driver
    pub fn dial_info(&self) -> DialInfo {
        let info = DialInfo::new(self.hosts.iter().cloned())
            .timeout(self.timeout())
            .pool_limit(self.pool_limit)
            .mode(self.mode);

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => info.auth(&self.database, username, password),
            _ => info,
        }
    }
}
