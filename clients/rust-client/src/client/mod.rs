//! Native driver client
//!
//! A [`Session`] is a logical handle over a shared [`pool`] of framed TCP
//! connections. Sessions are cheap to copy; every copy shares the transport
//! budget of the pool it was derived from but keeps its own consistency
//! cursor and its own reserved socket.

mod builder;
mod collection;
mod connection;
mod database;
mod pool;
mod query;

pub use builder::{Credentials, DialInfo, DEFAULT_DIAL_TIMEOUT};
pub use collection::Collection;
pub use database::Database;
pub use pool::{PoolStats, DEFAULT_POOL_LIMIT};
pub use query::Query;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

use self::pool::{ConnectionPool, PooledConnection};
use crate::protocol::{Command, ConsistencyMode, DriverError, Response};

const DIAL_RETRY_INTERVAL: Duration = Duration::from_millis(500);

pub struct Session {
    id: Uuid,
    pool: Arc<ConnectionPool>,
    mode: ConsistencyMode,
    /// Socket held between operations in reserving modes
    socket: Option<PooledConnection>,
    /// Highest server sequence number observed by this session
    cursor: Option<u64>,
}

impl Session {
    /// Dial the servers in `info` and return a session over a fresh pool.
    ///
    /// Addresses are tried in order, in rounds, until one accepts a
    /// connection and answers a ping or until `info.timeout` elapses.
    /// Authentication failures are returned immediately.
    pub async fn dial(info: &DialInfo) -> Result<Self, DriverError> {
        if info.addrs.is_empty() {
            return Err(DriverError::ConnectionError(
                "no server addresses configured".to_string(),
            ));
        }

        let pool = ConnectionPool::new(
            info.addrs.clone(),
            info.credentials.clone(),
            info.pool_limit,
        );

        let deadline = Instant::now() + info.timeout;
        let mut last_error: Option<DriverError> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let attempt = async {
                let mut conn = pool.open_connection().await?;
                conn.ping().await?;
                Ok::<_, DriverError>(conn)
            };

            match tokio::time::timeout(remaining, attempt).await {
                Ok(Ok(conn)) => {
                    pool.add_idle(conn);
                    break;
                }
                Ok(Err(e @ DriverError::AuthError(_))) => return Err(e),
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => break,
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(DIAL_RETRY_INTERVAL.min(remaining)).await;
        }

        if pool.stats().idle == 0 {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no response".to_string());
            return Err(DriverError::Timeout(format!(
                "no reachable servers in {:?} within {:?}: {}",
                pool.addrs(),
                info.timeout,
                reason
            )));
        }

        let session = Self::from_pool(pool, info.mode);
        tracing::info!(
            "Session {} established ({} mode) to {:?}",
            session.id,
            session.mode,
            info.addrs
        );
        Ok(session)
    }

    fn from_pool(pool: Arc<ConnectionPool>, mode: ConsistencyMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            pool,
            mode,
            socket: None,
            cursor: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    /// Change the consistency mode. With `refresh` the reserved socket and
    /// cursor are dropped; switching to `Eventual` always releases the socket.
    pub fn set_mode(&mut self, mode: ConsistencyMode, refresh: bool) {
        self.mode = mode;
        if refresh {
            self.refresh();
        } else if !mode.reserves_socket() {
            self.socket = None;
        }
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Whether a socket is currently reserved by this session
    pub fn has_socket(&self) -> bool {
        self.socket.as_ref().is_some_and(|s| !s.is_broken())
    }

    /// New logical session over the same pool with the same mode, no
    /// reserved socket and an empty cursor.
    pub fn copy(&self) -> Session {
        Self::from_pool(Arc::clone(&self.pool), self.mode)
    }

    /// Release the reserved socket and forget the cursor
    pub fn refresh(&mut self) {
        self.socket = None;
        self.cursor = None;
    }

    /// Release the session's socket back to the pool
    pub fn close(self) {
        tracing::trace!("Session {} closed", self.id);
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn database(&mut self, name: &str) -> Database<'_> {
        Database::new(self, name)
    }

    pub async fn ping(&mut self) -> Result<i64, DriverError> {
        match self.send_command(Command::Ping).await? {
            Response::Pong { timestamp } => Ok(timestamp),
            _ => Err(DriverError::ProtocolError(
                "Expected pong response".to_string(),
            )),
        }
    }

    /// Send a command, honoring the session mode, and advance the cursor.
    /// `error` responses are turned into `Err`.
    pub(crate) async fn send_command(&mut self, command: Command) -> Result<Response, DriverError> {
        let command = self.stamp(command);

        let result = if self.mode.reserves_socket() {
            // A cancelled call leaves its socket without a connection
            if self.socket.as_ref().is_some_and(PooledConnection::is_broken) {
                self.socket = None;
            }
            if self.socket.is_none() {
                self.socket = Some(self.pool.acquire().await?);
            }
            let result = match self.socket.as_mut() {
                Some(socket) => socket.round_trip(&command).await,
                None => Err(DriverError::SessionClosed),
            };
            if self.socket.as_ref().is_some_and(PooledConnection::is_broken) {
                self.socket = None;
            }
            result
        } else {
            let mut socket = self.pool.acquire().await?;
            socket.round_trip(&command).await
        };

        let response = result?;
        if let Some(seq) = response.seq() {
            self.cursor = Some(self.cursor.map_or(seq, |c| c.max(seq)));
        }

        match response {
            Response::Error { error } => Err(error),
            other => Ok(other),
        }
    }

    /// Fill in mode and cursor on read commands
    fn stamp(&self, command: Command) -> Command {
        let min = if self.mode.sends_cursor() {
            self.cursor
        } else {
            None
        };

        match command {
            Command::Find {
                database,
                collection,
                filter,
                limit,
                skip,
                ..
            } => Command::Find {
                database,
                collection,
                filter,
                limit,
                skip,
                mode: self.mode,
                min_seq: min,
            },
            Command::Count {
                database,
                collection,
                filter,
                ..
            } => Command::Count {
                database,
                collection,
                filter,
                mode: self.mode,
                min_seq: min,
            },
            other => other,
        }
    }

    /// Extract data from a response
    pub(crate) fn extract_data(response: Response) -> Result<Option<Value>, DriverError> {
        match response {
            Response::Ok { data, .. } => Ok(data),
            Response::Error { error } => Err(error),
            Response::Pong { .. } => Ok(None),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("cursor", &self.cursor)
            .field("has_socket", &self.socket.is_some())
            .finish()
    }
}
