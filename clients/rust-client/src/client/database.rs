use super::{Collection, Session};

/// Handle to a named database within a session
pub struct Database<'a> {
    session: &'a mut Session,
    name: String,
}

impl<'a> Database<'a> {
    pub(crate) fn new(session: &'a mut Session, name: &str) -> Self {
        Self {
            session,
            name: name.to_string(),
        }
    }

    pub fn collection(self, name: &str) -> Collection<'a> {
        Collection::new(self.session, self.name, name)
    }
}
