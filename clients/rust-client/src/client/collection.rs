use serde::Serialize;
use serde_json::Value;

use super::{Query, Session};
use crate::protocol::{Command, DriverError};

/// Handle to a collection, borrowed from a session
pub struct Collection<'a> {
    session: &'a mut Session,
    database: String,
    name: String,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(session: &'a mut Session, database: String, name: &str) -> Self {
        Self {
            session,
            database,
            name: name.to_string(),
        }
    }

    /// Start a query; `None` matches every document
    pub fn find(&mut self, filter: Option<Value>) -> Query<'_> {
        Query::new(&mut *self.session, &self.database, &self.name, filter)
    }

    /// Insert a document; advances the session cursor to the write
    pub async fn insert<T: Serialize>(&mut self, document: &T) -> Result<(), DriverError> {
        let document = serde_json::to_value(document)
            .map_err(|e| DriverError::ProtocolError(format!("Invalid document: {}", e)))?;

        let response = self
            .session
            .send_command(Command::Insert {
                database: self.database.clone(),
                collection: self.name.clone(),
                document,
            })
            .await?;
        Session::extract_data(response)?;
        Ok(())
    }
}
