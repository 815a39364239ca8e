use serde::{Deserialize, Serialize};

/// Read consistency of a session
///
/// `Eventual` borrows a socket per operation. `Monotonic` and `Strong`
/// reserve one socket for the life of the session and send the session
/// cursor with every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    Eventual,
    #[default]
    Monotonic,
    Strong,
}

impl ConsistencyMode {
    /// Whether the session keeps its socket between operations
    pub fn reserves_socket(self) -> bool {
        !matches!(self, ConsistencyMode::Eventual)
    }

    /// Whether reads carry the session cursor
    pub fn sends_cursor(self) -> bool {
        !matches!(self, ConsistencyMode::Eventual)
    }
}

impl std::fmt::Display for ConsistencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyMode::Eventual => write!(f, "eventual"),
            ConsistencyMode::Monotonic => write!(f, "monotonic"),
            ConsistencyMode::Strong => write!(f, "strong"),
        }
    }
}
