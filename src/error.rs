use fanquery_client::DriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    /// The initial pooled connection could not be established
    #[error("Connection error: {0}")]
    Connection(#[from] DriverError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
