use super::types::ConsistencyMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests a client can send over a driver connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Auth {
        database: String,
        username: String,
        password: String,
    },
    Ping,
    Find {
        database: String,
        collection: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skip: Option<usize>,
        #[serde(default)]
        mode: ConsistencyMode,
        /// Lowest sequence number the served view may reflect
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_seq: Option<u64>,
    },
    Count {
        database: String,
        collection: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Value>,
        #[serde(default)]
        mode: ConsistencyMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_seq: Option<u64>,
    },
    Insert {
        database: String,
        collection: String,
        document: Value,
    },
}
