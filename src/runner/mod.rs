//! Query fan-out runner
//!
//! Spawns one task per query identifier. Each task copies the root session,
//! runs a find-all against the configured collection, logs the outcome and
//! releases its copy. [`FanOutRunner::run`] returns once every task has
//! reported back through the join set.

mod report;

pub use report::{QueryOutcome, QueryStatus, RunReport};

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::config::RunnerConfig;
use crate::driver::{Driver, DriverError};
use crate::error::RunnerResult;
use crate::record::Foo;

pub struct FanOutRunner<D: Driver> {
    driver: Arc<D>,
    config: Arc<RunnerConfig>,
}

impl<D: Driver> FanOutRunner<D> {
    /// Validate `config` and dial the pooled connection.
    ///
    /// Fails without creating any session copy when no server answers
    /// within the configured timeout.
    pub async fn initialize(config: RunnerConfig) -> RunnerResult<Self> {
        config.validate()?;
        let driver = D::dial(&config.dial_info()).await?;
        Ok(Self::new(driver, config))
    }

    /// Wrap an already dialed driver
    pub fn new(driver: D, config: RunnerConfig) -> Self {
        Self {
            driver: Arc::new(driver),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run `concurrency` queries in parallel and wait for all of them.
    ///
    /// Failed queries are logged and reported, never propagated.
    pub async fn run(&self, concurrency: usize) -> RunReport {
        let mut set = JoinSet::new();

        for query in 0..concurrency {
            let driver = Arc::clone(&self.driver);
            let config = Arc::clone(&self.config);
            set.spawn(async move { run_query(query, driver.as_ref(), &config).await });
        }

        let mut outcomes = Vec::with_capacity(concurrency);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "Query task aborted"),
            }
        }

        // A task that panicked still counts as a completed unit of work
        let reported: HashSet<usize> = outcomes.iter().map(|o| o.query).collect();
        for query in (0..concurrency).filter(|q| !reported.contains(q)) {
            let error = "query task panicked".to_string();
            tracing::error!(query, error = %error, "Query failed");
            outcomes.push(QueryOutcome::failed(query, error));
        }

        let report = RunReport::new(outcomes);
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "All Queries Completed"
        );
        report
    }
}

/// Owns a session copy and closes it on every exit path, unwinding included
struct SessionGuard<'a, D: Driver> {
    driver: &'a D,
    session: Option<D::Session>,
}

impl<'a, D: Driver> SessionGuard<'a, D> {
    fn copy_from(driver: &'a D) -> Self {
        Self {
            driver,
            session: Some(driver.copy_session()),
        }
    }

    fn session(&mut self) -> Option<&mut D::Session> {
        self.session.as_mut()
    }
}

impl<D: Driver> Drop for SessionGuard<'_, D> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.driver.close_session(session);
        }
    }
}

async fn run_query<D: Driver>(query: usize, driver: &D, config: &RunnerConfig) -> QueryOutcome {
    let mut guard = SessionGuard::copy_from(driver);
    tracing::info!(query, "Executing");

    let mut attempt = 0u32;
    loop {
        let result: Result<Vec<Foo>, DriverError> = match guard.session() {
            Some(session) => {
                driver
                    .find(session, &config.database, &config.collection, None)
                    .await
            }
            None => Err(DriverError::SessionClosed),
        };

        match result {
            Ok(records) => {
                tracing::info!(query, count = records.len(), "Query completed");
                return QueryOutcome::succeeded(query, records.len());
            }
            Err(e) if attempt < config.query_retries => {
                attempt += 1;
                tracing::warn!(query, attempt, error = %e, "Query failed, retrying");
                if let Some(session) = guard.session() {
                    driver.refresh_session(session);
                }
                tokio::time::sleep(config.retry_backoff()).await;
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Query failed");
                return QueryOutcome::failed(query, e.to_string());
            }
        }
    }
}
