//! Registry of live sessions.
//!
//! Sessions are stored as `Arc<Mutex<Session>>` in a [`DashMap`]. The map
//! shard lock is only held long enough to clone the `Arc`; the turn itself
//! runs under the session's own mutex. Different sessions therefore proceed
//! in parallel while actions on the same session are serialized.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use presidency_core::prelude::DeltaTables;
use tracing::info;

use crate::config::SessionConfig;
use crate::session::{Action, ArchiveRecord, Session, SessionId, TurnOutcome};
use crate::SessionError;

/// Concurrent map of live sessions, keyed by [`SessionId`].
///
/// Ids are handed out in ascending order starting at 1 and are never reused.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
    next_id: AtomicU64,
    tables: Arc<DeltaTables>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// A registry whose sessions use the builtin tables.
    pub fn new() -> Self {
        Self::with_tables(DeltaTables::builtin())
    }

    /// A registry whose sessions share `tables`.
    pub fn with_tables(tables: Arc<DeltaTables>) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            tables,
        }
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of every open session, ascending.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    /// Start a new session and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `config` does not validate.
    pub fn open(&self, config: SessionConfig) -> Result<SessionId, SessionError> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::new(id, config, Arc::clone(&self.tables))?;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!(session = %id, "session opened");
        Ok(id)
    }

    fn handle(&self, id: SessionId) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Run `f` with exclusive access to one session.
    pub fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().map_err(|_| SessionError::Poisoned(id))?;
        Ok(f(&mut session))
    }

    /// Resolve one action on session `id`. See [`Session::act`].
    pub fn act(&self, id: SessionId, action: &Action) -> Result<TurnOutcome, SessionError> {
        self.with_session(id, |session| session.act(action))?
    }

    /// Remove a session and return its final archive: the automatic archive
    /// if it already ended, otherwise it is ended now.
    pub fn close(&self, id: SessionId) -> Result<ArchiveRecord, SessionError> {
        let (_, handle) = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::UnknownSession(id))?;
        let mut session = handle.lock().map_err(|_| SessionError::Poisoned(id))?;

        let record = if session.is_concluded() {
            let last_auto = session
                .archives()
                .iter()
                .rev()
                .find(|r| r.kind == presidency_chronicle::ArchiveKind::Auto)
                .cloned();
            match last_auto {
                Some(record) => record,
                None => session.export_archive()?,
            }
        } else {
            session.end()?
        };
        info!(session = %id, turn = session.turn(), "session closed");
        Ok(record)
    }
}
