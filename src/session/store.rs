//! In-memory session store

use dashmap::DashMap;
use tracing::debug;

use super::{RoutingMode, SessionId};

/// Process-wide mapping from session to its selected routing mode.
///
/// Entries live in a sharded map with per-key locking, so sessions on
/// different keys never contend on or observe each other's writes. Nothing
/// is persisted; the store dies with the process.
pub struct SessionStore {
    sessions: DashMap<SessionId, RoutingMode>,
    default_mode: RoutingMode,
}

impl SessionStore {
    /// Create an empty store handing out `default_mode` to new sessions
    pub fn new(default_mode: RoutingMode) -> Self {
        Self {
            sessions: DashMap::new(),
            default_mode,
        }
    }

    /// Mode of the session, creating the session with the default on first access
    pub fn get_mode(&self, session: &SessionId) -> RoutingMode {
        if let Some(mode) = self.sessions.get(session) {
            return mode.value().clone();
        }

        self.sessions
            .entry(session.clone())
            .or_insert_with(|| {
                debug!(session = %session, mode = %self.default_mode, "Created session");
                self.default_mode.clone()
            })
            .value()
            .clone()
    }

    /// Record an explicit mode selection
    pub fn set_mode(&self, session: &SessionId, mode: RoutingMode) {
        debug!(session = %session, mode = %mode, "Session mode selected");
        self.sessions.insert(session.clone(), mode);
    }

    /// Mode handed to sessions without a selection
    pub fn default_mode(&self) -> &RoutingMode {
        &self.default_mode
    }

    /// Number of sessions seen so far
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
