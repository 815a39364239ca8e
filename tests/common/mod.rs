//! Test doubles for the runner
//!
//! `FakeDriver` implements the driver capability interface in memory and
//! counts every copy, find and close so tests can check that no session copy
//! leaks. Drivers are looked up by the first dial address, which lets a test
//! keep a handle on the state of a driver the runner dials itself.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use fanquery::driver::{DialInfo, Driver, DriverError};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

#[derive(Default)]
pub struct FakeState {
    pub dials: AtomicUsize,
    pub copies: AtomicUsize,
    pub closes: AtomicUsize,
    pub finds: AtomicUsize,
    pub refreshes: AtomicUsize,
    /// Records returned by every successful find
    pub record_count: usize,
    pub fail_dial: bool,
    /// Number of find calls, counted from the first, that return an error
    pub failing_finds: usize,
    /// Panic inside the first find call
    pub panic_first_find: AtomicBool,
}

impl FakeState {
    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

fn registry() -> &'static Mutex<HashMap<String, Arc<FakeState>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<FakeState>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register fake state under `addr` for `FakeDriver::dial` to find
pub fn register(addr: &str, state: FakeState) -> Arc<FakeState> {
    let state = Arc::new(state);
    registry().lock().insert(addr.to_string(), Arc::clone(&state));
    state
}

pub struct FakeDriver {
    pub state: Arc<FakeState>,
}

impl FakeDriver {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

pub struct FakeSession {
    pub serial: usize,
}

#[async_trait]
impl Driver for FakeDriver {
    type Session = FakeSession;

    async fn dial(info: &DialInfo) -> Result<Self, DriverError> {
        let addr = info.addrs.first().cloned().unwrap_or_default();
        let state = registry()
            .lock()
            .get(&addr)
            .cloned()
            .ok_or_else(|| DriverError::ConnectionError(format!("unknown address {}", addr)))?;

        state.dials.fetch_add(1, Ordering::SeqCst);
        if state.fail_dial {
            return Err(DriverError::Timeout(format!(
                "no reachable servers in [\"{}\"]",
                addr
            )));
        }
        Ok(Self { state })
    }

    fn copy_session(&self) -> FakeSession {
        FakeSession {
            serial: self.state.copies.fetch_add(1, Ordering::SeqCst),
        }
    }

    async fn find<T>(
        &self,
        _session: &mut FakeSession,
        _database: &str,
        _collection: &str,
        _filter: Option<Value>,
    ) -> Result<Vec<T>, DriverError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let call = self.state.finds.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.state.panic_first_find.swap(false, Ordering::SeqCst) {
            panic!("fake driver exploded");
        }
        if call < self.state.failing_finds {
            return Err(DriverError::DatabaseError(format!("find #{} rejected", call)));
        }

        let docs: Vec<Value> = (0..self.state.record_count)
            .map(|i| json!({"name": format!("foo-{}", i)}))
            .collect();
        serde_json::from_value(Value::Array(docs))
            .map_err(|e| DriverError::ProtocolError(e.to_string()))
    }

    fn close_session(&self, _session: FakeSession) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn refresh_session(&self, _session: &mut FakeSession) {
        self.state.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Lines containing every one of `needles`
    pub fn lines_with(&self, needles: &[&str]) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| needles.iter().all(|n| line.contains(n)))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Install a thread-local subscriber writing into a fresh buffer
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
