use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use daybook_db::{Database, StoreError, StoreResult};
use daybook_types::models::User;

use crate::credentials;
use crate::session::Session;

pub type SharedSession = Arc<Mutex<Session>>;

/// In-process registry of live sessions, keyed by the session id embedded in
/// each auth token. A session stays resident until logout or shutdown.
pub struct SessionManager {
    db: Arc<Database>,
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
}

impl SessionManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Verify credentials and, on success, open a session loaded with the
    /// user's records. None means the pair did not check out.
    pub fn login(
        &self,
        username: &str,
        password: &str,
    ) -> StoreResult<Option<(Uuid, SharedSession)>> {
        let Some(user) = credentials::authenticate(&self.db, username, password)? else {
            return Ok(None);
        };
        Ok(Some(self.open_for(user)?))
    }

    /// Open a session for an already-verified user. Used after registration,
    /// which logs the new account straight in.
    pub fn open_for(&self, user: User) -> StoreResult<(Uuid, SharedSession)> {
        let session = Session::load(Arc::clone(&self.db), user)?;
        let sid = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));
        self.registry()?.insert(sid, Arc::clone(&shared));
        Ok((sid, shared))
    }

    pub fn get(&self, sid: Uuid) -> StoreResult<Option<SharedSession>> {
        Ok(self.registry()?.get(&sid).cloned())
    }

    /// Drop the session. True when there was one to drop; a token for an
    /// already-closed session is not an error.
    pub fn logout(&self, sid: Uuid) -> StoreResult<bool> {
        Ok(self.registry()?.remove(&sid).is_some())
    }

    fn registry(&self) -> StoreResult<MutexGuard<'_, HashMap<Uuid, SharedSession>>> {
        self.sessions
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}
