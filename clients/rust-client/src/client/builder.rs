use std::time::Duration;

use super::pool::DEFAULT_POOL_LIMIT;
use super::Session;
use crate::protocol::{ConsistencyMode, DriverError};

pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials sent on every new pooled connection
#[derive(Clone)]
pub struct Credentials {
    pub database: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Everything needed to dial a pooled session
#[derive(Debug, Clone)]
pub struct DialInfo {
    pub addrs: Vec<String>,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
    pub pool_limit: usize,
    pub mode: ConsistencyMode,
}

impl DialInfo {
    /// Create dial info for the given `host:port` addresses
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addrs: addrs.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_DIAL_TIMEOUT,
            credentials: None,
            pool_limit: DEFAULT_POOL_LIMIT,
            mode: ConsistencyMode::default(),
        }
    }

    /// Set authentication credentials
    pub fn auth(mut self, database: &str, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials {
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Set how long dialing may keep trying before giving up
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool_limit(mut self, limit: usize) -> Self {
        self.pool_limit = limit;
        self
    }

    pub fn mode(mut self, mode: ConsistencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Dial and return the root session
    pub async fn dial(self) -> Result<Session, DriverError> {
        Session::dial(&self).await
    }
}
