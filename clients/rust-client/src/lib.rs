//! fanquery native driver
//!
//! Pooled sessions over a framed MessagePack protocol. A dialed [`Session`]
//! owns nothing but a handle to the pool; copies are cheap and each keeps its
//! own consistency cursor.
//!
//! # Protocol Overview
//!
//! - **Magic Header**: `fanquery-drv-v1\0` (16 bytes, sent once on connection)
//! - **Request Frame**: `[length: 4 bytes BE][msgpack payload]`
//! - **Response Frame**: `[length: 4 bytes BE][msgpack payload]`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use fanquery_client::{ConsistencyMode, DialInfo};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fanquery_client::DriverError> {
//!     let session = DialInfo::new(["localhost:6745"])
//!         .timeout(Duration::from_secs(60))
//!         .mode(ConsistencyMode::Monotonic)
//!         .dial()
//!         .await?;
//!
//!     let mut copy = session.copy();
//!     let docs: Vec<serde_json::Value> = copy
//!         .database("fanquery_example")
//!         .collection("foo")
//!         .find(None)
//!         .all()
//!         .await?;
//!     println!("Found {} documents", docs.len());
//!     copy.close();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod protocol;

pub use client::{
    Collection, Credentials, Database, DialInfo, PoolStats, Query, Session, DEFAULT_DIAL_TIMEOUT,
    DEFAULT_POOL_LIMIT,
};
pub use protocol::{Command, ConsistencyMode, DriverError, Response};
