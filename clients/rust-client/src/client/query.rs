use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Session;
use crate::protocol::{Command, ConsistencyMode, DriverError, Response};

/// A pending `find`, executed by [`Query::all`], [`Query::one`] or
/// [`Query::count`]
pub struct Query<'a> {
    session: &'a mut Session,
    database: &'a str,
    collection: &'a str,
    filter: Option<Value>,
    limit: Option<usize>,
    skip: Option<usize>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(
        session: &'a mut Session,
        database: &'a str,
        collection: &'a str,
        filter: Option<Value>,
    ) -> Self {
        Self {
            session,
            database,
            collection,
            filter,
            limit: None,
            skip: None,
        }
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Run the query and decode every matching document into memory
    pub async fn all<T: DeserializeOwned>(self) -> Result<Vec<T>, DriverError> {
        let response = self
            .session
            .send_command(Command::Find {
                database: self.database.to_string(),
                collection: self.collection.to_string(),
                filter: self.filter,
                limit: self.limit,
                skip: self.skip,
                mode: ConsistencyMode::default(),
                min_seq: None,
            })
            .await?;

        let data = Session::extract_data(response)?
            .ok_or_else(|| DriverError::ProtocolError("Expected data".to_string()))?;

        serde_json::from_value(data)
            .map_err(|e| DriverError::ProtocolError(format!("Invalid response: {}", e)))
    }

    /// First matching document, if any
    pub async fn one<T: DeserializeOwned>(self) -> Result<Option<T>, DriverError> {
        let mut docs: Vec<T> = self.limit(1).all().await?;
        Ok(if docs.is_empty() {
            None
        } else {
            Some(docs.swap_remove(0))
        })
    }

    pub async fn count(self) -> Result<usize, DriverError> {
        let response = self
            .session
            .send_command(Command::Count {
                database: self.database.to_string(),
                collection: self.collection.to_string(),
                filter: self.filter,
                mode: ConsistencyMode::default(),
                min_seq: None,
            })
            .await?;

        match response {
            Response::Ok {
                count: Some(count), ..
            } => Ok(count),
            _ => Err(DriverError::ProtocolError("Expected count".to_string())),
        }
    }
}
