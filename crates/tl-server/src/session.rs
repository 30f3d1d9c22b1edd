use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tl_ledger::{HashAlgorithm, Ledger};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

pub type SessionId = Uuid;

/// A session's ledger. The mutex is the boundary that makes
/// read-tail-then-append atomic when requests for one session overlap.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Owns one ledger per open session.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedLedger>>,
    max_sessions: usize,
    algorithm: HashAlgorithm,
}

impl SessionStore {
    pub fn new(max_sessions: usize, algorithm: HashAlgorithm) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            algorithm,
        }
    }

    fn read(&self) -> ServerResult<RwLockReadGuard<'_, HashMap<SessionId, SharedLedger>>> {
        self.sessions
            .read()
            .map_err(|_| ServerError::Internal("session table lock poisoned".into()))
    }

    fn write(&self) -> ServerResult<RwLockWriteGuard<'_, HashMap<SessionId, SharedLedger>>> {
        self.sessions
            .write()
            .map_err(|_| ServerError::Internal("session table lock poisoned".into()))
    }

    /// Open a session with a fresh ledger.
    pub fn create(&self) -> ServerResult<SessionId> {
        let mut sessions = self.write()?;
        if sessions.len() >= self.max_sessions {
            return Err(ServerError::SessionLimit(sessions.len()));
        }
        let id = Uuid::new_v4();
        sessions.insert(id, Arc::new(Mutex::new(Ledger::with_algorithm(self.algorithm))));
        tracing::info!(session = %id, active = sessions.len(), "session opened");
        Ok(id)
    }

    pub fn get(&self, id: SessionId) -> ServerResult<SharedLedger> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(ServerError::SessionNotFound(id))
    }

    /// Close a session, dropping its ledger.
    pub fn remove(&self, id: SessionId) -> ServerResult<()> {
        let mut sessions = self.write()?;
        sessions
            .remove(&id)
            .ok_or(ServerError::SessionNotFound(id))?;
        tracing::info!(session = %id, active = sessions.len(), "session closed");
        Ok(())
    }

    pub fn len(&self) -> ServerResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ServerResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Lock a session ledger.
pub fn lock(ledger: &SharedLedger) -> ServerResult<MutexGuard<'_, Ledger>> {
    ledger
        .lock()
        .map_err(|_| ServerError::Internal("ledger lock poisoned".into()))
}
