use super::error::DriverError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
        /// Server sequence number the operation observed or produced
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seq: Option<u64>,
    },
    Error {
        error: DriverError,
    },
    Pong {
        timestamp: i64,
    },
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Response::Ok {
            data: Some(data),
            count: None,
            seq: None,
        }
    }

    pub fn ok_count(count: usize) -> Self {
        Response::Ok {
            data: None,
            count: Some(count),
            seq: None,
        }
    }

    pub fn ok_empty() -> Self {
        Response::Ok {
            data: None,
            count: None,
            seq: None,
        }
    }

    /// Attach a sequence number to an `ok` response
    pub fn with_seq(self, seq: u64) -> Self {
        match self {
            Response::Ok { data, count, .. } => Response::Ok {
                data,
                count,
                seq: Some(seq),
            },
            other => other,
        }
    }

    pub fn error(err: DriverError) -> Self {
        Response::Error { error: err }
    }

    pub fn pong() -> Self {
        Response::Pong {
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Sequence number carried by the response, if any
    pub fn seq(&self) -> Option<u64> {
        match self {
            Response::Ok { seq, .. } => *seq,
            _ => None,
        }
    }
}
