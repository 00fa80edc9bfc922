//! TTL-bound in-memory session store
//!
//! Every read and write refreshes `last_activity` (sliding expiration).
//! Expired entries are dropped lazily on `get_or_create` and eagerly by
//! `sweep`, which takes the same lock as the per-key operations.

use super::Session;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Default idle lifetime of a session
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Thread-safe keyed store of sessions
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a snapshot of the session, creating a fresh one if it is absent or expired
    pub fn get_or_create(&self, session_id: &str) -> Session {
        self.get_or_create_at(session_id, Utc::now())
    }

    pub(crate) fn get_or_create_at(&self, session_id: &str, now: DateTime<Utc>) -> Session {
        let mut sessions = self.lock();

        if let Some(existing) = sessions.get_mut(session_id) {
            if !existing.is_expired(now, self.ttl) {
                existing.touch(now);
                return existing.clone();
            }
            tracing::info!(session_id = %session_id, "Session expired, starting fresh");
        }

        let session = Session::new(session_id, now);
        sessions.insert(session_id.to_string(), session.clone());
        session
    }

    /// Apply `f` to the stored session and refresh its activity time.
    ///
    /// Returns the updated snapshot, or `None` if no live session exists.
    pub fn update<F>(&self, session_id: &str, f: F) -> Option<Session>
    where
        F: FnOnce(&mut Session),
    {
        self.update_at(session_id, Utc::now(), f)
    }

    pub(crate) fn update_at<F>(&self, session_id: &str, now: DateTime<Utc>, f: F) -> Option<Session>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.lock();
        let session = sessions.get_mut(session_id)?;
        f(session);
        session.touch(now);
        Some(session.clone())
    }

    /// Write back a working copy taken from `get_or_create`
    pub fn save(&self, mut session: Session) {
        session.touch(Utc::now());
        self.lock().insert(session.session_id().to_string(), session);
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    /// Remove every expired session; returns how many were dropped
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub(crate) fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}
