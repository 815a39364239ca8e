//! In-process mock server speaking the driver wire protocol
//!
//! Serves a fixed document set and records what clients send so tests can
//! assert on connection counts and read cursors.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fanquery_client::protocol::{decode_message, encode_response, DRIVER_MAGIC};
use fanquery_client::{Command, DriverError, Response};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
pub struct MockState {
    pub connections: AtomicUsize,
    pub docs: Mutex<Vec<Value>>,
    pub seq: AtomicU64,
    /// `min_seq` of every read received, in arrival order
    pub read_cursors: Mutex<Vec<Option<u64>>>,
    pub password: Mutex<Option<String>>,
    /// Answer finds with an error response
    pub fail_finds: AtomicBool,
    /// Hang up instead of answering finds
    pub drop_on_find: AtomicBool,
    /// Hold every find reply back this long
    pub find_delay_ms: AtomicU64,
}

pub struct MockServer {
    pub addr: String,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn start(docs: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let state = Arc::new(MockState::default());
        *state.docs.lock() = docs;

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accept_state.connections.fetch_add(1, Ordering::SeqCst);
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    serve_connection(stream, state).await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn with_password(self, password: &str) -> Self {
        *self.state.password.lock() = Some(password.to_string());
        self
    }

    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub fn read_cursors(&self) -> Vec<Option<u64>> {
        self.state.read_cursors.lock().clone()
    }
}

/// An address nothing listens on
pub async fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

async fn serve_connection(mut stream: TcpStream, state: Arc<MockState>) {
    let mut magic = vec![0u8; DRIVER_MAGIC.len()];
    if stream.read_exact(&mut magic).await.is_err() || magic != DRIVER_MAGIC {
        return;
    }

    loop {
        let mut len_buf = [0u8; 4];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut payload = vec![0u8; u32::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut payload).await.is_err() {
            return;
        }

        let response = match decode_message::<Command>(&payload) {
            Ok(Command::Find { .. }) if state.drop_on_find.load(Ordering::SeqCst) => return,
            Ok(command @ Command::Find { .. }) => {
                let delay = state.find_delay_ms.load(Ordering::SeqCst);
                if delay > 0 {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                execute(command, &state)
            }
            Ok(command) => execute(command, &state),
            Err(e) => Response::error(e),
        };

        let frame = encode_response(&response).unwrap();
        if stream.write_all(&frame).await.is_err() {
            return;
        }
    }
}

fn execute(command: Command, state: &MockState) -> Response {
    match command {
        Command::Ping => Response::pong(),
        Command::Auth { password, .. } => match state.password.lock().as_deref() {
            Some(expected) if expected != password => {
                Response::error(DriverError::AuthError("Invalid credentials".to_string()))
            }
            _ => Response::ok_empty(),
        },
        Command::Find {
            limit,
            skip,
            min_seq,
            ..
        } => {
            state.read_cursors.lock().push(min_seq);
            if state.fail_finds.load(Ordering::SeqCst) {
                return Response::error(DriverError::DatabaseError(
                    "collection unavailable".to_string(),
                ));
            }
            let docs: Vec<Value> = state
                .docs
                .lock()
                .iter()
                .skip(skip.unwrap_or(0))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            Response::ok(Value::Array(docs)).with_seq(state.seq.load(Ordering::SeqCst))
        }
        Command::Count { min_seq, .. } => {
            state.read_cursors.lock().push(min_seq);
            Response::ok_count(state.docs.lock().len())
        }
        Command::Insert { document, .. } => {
            state.docs.lock().push(document);
            let seq = state.seq.fetch_add(1, Ordering::SeqCst) + 1;
            Response::ok_empty().with_seq(seq)
        }
    }
}
