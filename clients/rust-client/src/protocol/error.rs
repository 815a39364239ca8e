use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Driver protocol error types
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriverError {
    /// Connection or I/O error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// No server answered within the dial timeout
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Protocol violation
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    /// Database operation error
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Authentication error
    #[error("Auth error: {0}")]
    AuthError(String),
    #[error("Message too large")]
    MessageTooLarge,
    /// Operation attempted on a session after close
    #[error("Session closed")]
    SessionClosed,
}
