use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{
    decode_message, encode_command, Command, DriverError, Response, DRIVER_MAGIC, MAX_MESSAGE_SIZE,
};

/// A single framed transport connection to one server
pub(crate) struct Connection {
    stream: TcpStream,
    addr: String,
    /// Pool gauge of live connections, released when the connection drops
    gauge: Option<Arc<AtomicUsize>>,
}

impl Connection {
    /// Open a TCP connection and send the magic header
    pub(crate) async fn open(addr: &str) -> Result<Self, DriverError> {
        let mut stream = TcpStream::connect(addr).await.map_err(|e| {
            DriverError::ConnectionError(format!("Failed to connect to {}: {}", addr, e))
        })?;

        stream.set_nodelay(true).map_err(|e| {
            DriverError::ConnectionError(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        stream.write_all(DRIVER_MAGIC).await.map_err(|e| {
            DriverError::ConnectionError(format!("Failed to send magic header: {}", e))
        })?;
        stream
            .flush()
            .await
            .map_err(|e| DriverError::ConnectionError(format!("Failed to flush: {}", e)))?;

        Ok(Self {
            stream,
            addr: addr.to_string(),
            gauge: None,
        })
    }

    /// Count this connection in `gauge` for as long as it lives
    pub(crate) fn track(&mut self, gauge: &Arc<AtomicUsize>) {
        gauge.fetch_add(1, Ordering::SeqCst);
        self.gauge = Some(Arc::clone(gauge));
    }

    pub(crate) fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one command and read exactly one response frame
    pub(crate) async fn round_trip(&mut self, command: &Command) -> Result<Response, DriverError> {
        let frame = encode_command(command)?;
        self.exchange(&frame).await
    }

    /// Write an already encoded frame and read the reply frame.
    ///
    /// Any error other than a decode failure leaves the stream at an unknown
    /// position, and the connection must not be reused.
    pub(crate) async fn exchange(&mut self, frame: &[u8]) -> Result<Response, DriverError> {
        self.stream
            .write_all(frame)
            .await
            .map_err(|e| DriverError::ConnectionError(format!("Write failed: {}", e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| DriverError::ConnectionError(format!("Flush failed: {}", e)))?;

        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| DriverError::ConnectionError(format!("Read length failed: {}", e)))?;

        let msg_len = u32::from_be_bytes(len_buf) as usize;
        if msg_len > MAX_MESSAGE_SIZE {
            return Err(DriverError::MessageTooLarge);
        }

        let mut payload = vec![0u8; msg_len];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(|e| DriverError::ConnectionError(format!("Read payload failed: {}", e)))?;

        decode_message(&payload)
    }

    pub(crate) async fn ping(&mut self) -> Result<i64, DriverError> {
        match self.round_trip(&Command::Ping).await? {
            Response::Pong { timestamp } => Ok(timestamp),
            Response::Error { error } => Err(error),
            _ => Err(DriverError::ProtocolError(
                "Expected pong response".to_string(),
            )),
        }
    }

    pub(crate) async fn authenticate(
        &mut self,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<(), DriverError> {
        let response = self
            .round_trip(&Command::Auth {
                database: database.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        match response {
            Response::Ok { .. } => Ok(()),
            Response::Error {
                error: DriverError::AuthError(msg),
            } => Err(DriverError::AuthError(msg)),
            Response::Error { error } => Err(DriverError::AuthError(error.to_string())),
            _ => Err(DriverError::ProtocolError(
                "Unexpected response".to_string(),
            )),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(gauge) = self.gauge.take() {
            gauge.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
