//! Capability interface over the native driver
//!
//! The runner only needs four things from a database driver: dial a pooled
//! session, copy it, run a `find` on a copy, and close the copy. [`Driver`]
//! names exactly those so tests can swap in a fake collaborator. The real
//! implementation is the driver's own root [`Session`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use fanquery_client::{ConsistencyMode, DialInfo, DriverError, PoolStats, Session};

#[async_trait]
pub trait Driver: Send + Sync + Sized + 'static {
    /// Independently owned handle produced by [`Driver::copy_session`]
    type Session: Send + 'static;

    /// Establish the pooled connection
    async fn dial(info: &DialInfo) -> Result<Self, DriverError>;

    /// Derive a new logical session sharing this driver's transport pool
    fn copy_session(&self) -> Self::Session;

    /// Materialize every document matching `filter` (`None` matches all)
    async fn find<T>(
        &self,
        session: &mut Self::Session,
        database: &str,
        collection: &str,
        filter: Option<Value>,
    ) -> Result<Vec<T>, DriverError>
    where
        T: DeserializeOwned + Send + 'static;

    /// Give the session's resources back to the pool
    fn close_session(&self, session: Self::Session);

    /// Drop any reserved socket and cursor before another attempt
    fn refresh_session(&self, _session: &mut Self::Session) {}
}

#[async_trait]
impl Driver for Session {
    type Session = Session;

    async fn dial(info: &DialInfo) -> Result<Self, DriverError> {
        Session::dial(info).await
    }

    fn copy_session(&self) -> Session {
        self.copy()
    }

    async fn find<T>(
        &self,
        session: &mut Session,
        database: &str,
        collection: &str,
        filter: Option<Value>,
    ) -> Result<Vec<T>, DriverError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut target = session.database(database).collection(collection);
        let records = target.find(filter).all().await?;
        Ok(records)
    }

    fn close_session(&self, session: Session) {
        session.close();
    }

    fn refresh_session(&self, session: &mut Session) {
        session.refresh();
    }
}
