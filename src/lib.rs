pub mod config;
pub mod driver;
pub mod error;
pub mod record;
pub mod runner;

pub use config::RunnerConfig;
pub use driver::{ConsistencyMode, DialInfo, Driver, DriverError, Session};
pub use error::{RunnerError, RunnerResult};
pub use record::Foo;
pub use runner::{FanOutRunner, QueryOutcome, QueryStatus, RunReport};
