//! Connection pool shared by a session and all of its copies
//!
//! The pool owns a transport budget: at most `limit` connections can be
//! checked out at once, across every session derived from the same dial.
//! Checked-in connections are kept idle and reused last-in first-out.
//!
//! A new connection is only opened when the idle set is empty, so the
//! number of live connections never exceeds `limit`: the connection verified
//! during dial sits in the idle set and is the first one handed out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::builder::Credentials;
use super::connection::Connection;
use crate::protocol::{encode_command, Command, DriverError, Response};

pub const DEFAULT_POOL_LIMIT: usize = 4096;

/// Point-in-time pool counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Connections currently alive (idle or checked out), at most `limit`
    pub open: usize,
    pub idle: usize,
    pub in_use: usize,
    pub limit: usize,
}

pub(crate) struct ConnectionPool {
    addrs: Vec<String>,
    credentials: Option<Credentials>,
    idle: Mutex<Vec<Connection>>,
    budget: Arc<Semaphore>,
    limit: usize,
    open: Arc<AtomicUsize>,
}

impl ConnectionPool {
    pub(crate) fn new(
        addrs: Vec<String>,
        credentials: Option<Credentials>,
        limit: usize,
    ) -> Arc<Self> {
        let limit = limit.max(1);
        Arc::new(Self {
            addrs,
            credentials,
            idle: Mutex::new(Vec::new()),
            budget: Arc::new(Semaphore::new(limit)),
            limit,
            open: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub(crate) fn addrs(&self) -> &[String] {
        &self.addrs
    }

    /// Dial the configured addresses in order and return the first that
    /// accepts and authenticates.
    pub(crate) async fn open_connection(&self) -> Result<Connection, DriverError> {
        let mut last_error =
            DriverError::ConnectionError("no server addresses configured".to_string());

        for addr in &self.addrs {
            match Connection::open(addr).await {
                Ok(mut conn) => {
                    if let Some(creds) = &self.credentials {
                        conn.authenticate(&creds.database, &creds.username, &creds.password)
                            .await?;
                    }
                    conn.track(&self.open);
                    tracing::debug!("Opened driver connection to {}", conn.addr());
                    return Ok(conn);
                }
                Err(e) => {
                    tracing::debug!("Dial {} failed: {}", addr, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Check a connection out of the pool, waiting for budget if exhausted
    pub(crate) async fn acquire(self: &Arc<Self>) -> Result<PooledConnection, DriverError> {
        let permit = Arc::clone(&self.budget)
            .acquire_owned()
            .await
            .map_err(|_| DriverError::SessionClosed)?;

        let reused = self.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => self.open_connection().await?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Hand a verified connection to the idle set without using budget
    pub(crate) fn add_idle(&self, conn: Connection) {
        self.idle.lock().push(conn);
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            open: self.open.load(Ordering::SeqCst),
            idle: self.idle.lock().len(),
            in_use: self.limit - self.budget.available_permits(),
            limit: self.limit,
        }
    }
}

/// A checked-out connection; returns itself to the idle set on drop
pub(crate) struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<ConnectionPool>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Round trip on the underlying connection.
    ///
    /// The connection is taken out for the duration of the exchange and only
    /// put back once a whole reply frame has been read. A transport failure,
    /// or a caller that drops this future mid-exchange, drops the connection
    /// instead of leaving an unread reply on it.
    pub(crate) async fn round_trip(&mut self, command: &Command) -> Result<Response, DriverError> {
        if self.conn.is_none() {
            return Err(DriverError::SessionClosed);
        }

        // Encoding failures happen before any byte is written
        let frame = encode_command(command)?;

        let mut conn = self.conn.take().ok_or(DriverError::SessionClosed)?;
        let result = conn.exchange(&frame).await;

        match result {
            Err(e @ DriverError::ConnectionError(_)) | Err(e @ DriverError::MessageTooLarge) => {
                tracing::warn!("Discarding broken driver connection to {}: {}", conn.addr(), e);
                Err(e)
            }
            other => {
                self.conn = Some(conn);
                other
            }
        }
    }

    pub(crate) fn is_broken(&self) -> bool {
        self.conn.is_none()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.add_idle(conn);
        }
    }
}
