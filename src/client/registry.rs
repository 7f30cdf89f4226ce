//! Session registry
//!
//! The set of authenticated, connected sessions. One mutex guards the whole
//! map: admission, removal, fan-out, and listing never interleave, so no
//! reader sees a half-updated set and every recipient sees broadcasts in
//! the same order.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::client::session::{SessionHandle, SessionId};
use crate::error::RegistryError;

/// Outcome of one fan-out.
#[derive(Debug, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: Vec<SessionId>,
}

/// Registry for tracking active sessions
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the identity for a new connection.
    pub fn next_session_id(&self) -> SessionId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Admits a session, writing `greeting` to it first.
    ///
    /// Rejected if another session with the same username is active; the
    /// handle is returned inside the error so the caller can still reply.
    pub async fn add(
        &self,
        mut session: SessionHandle,
        greeting: &[String],
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;

        if sessions
            .values()
            .any(|active| active.username() == session.username())
        {
            return Err(RegistryError::UsernameActive(session));
        }

        session
            .writer_mut()
            .write_lines(greeting)
            .await
            .map_err(RegistryError::Transport)?;

        sessions.insert(session.id(), session);
        Ok(())
    }

    /// Removes a session. Removing one that is not present is a no-op.
    pub async fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.remove(&id)
    }

    /// Delivers `line` to every registered session.
    ///
    /// A failed write does not stop the fan-out; the failing session is
    /// dropped from the registry and its loop is told to close.
    pub async fn broadcast(&self, line: &str) -> BroadcastReport {
        let mut sessions = self.sessions.lock().await;
        let mut report = BroadcastReport::default();

        for (id, session) in sessions.iter_mut() {
            match session.writer_mut().write_line(line).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Failed to deliver to {}: {}", session.username(), e);
                    report.failed.push(*id);
                }
            }
        }

        for id in &report.failed {
            if let Some(session) = sessions.remove(id) {
                session.liveness().close();
            }
        }

        debug!(
            "Broadcast delivered to {} session(s), {} failed",
            report.delivered,
            report.failed.len()
        );
        report
    }

    /// Sends `message` to a single session.
    ///
    /// Returns false if the session is not registered or the write failed,
    /// in which case it is evicted like a failed broadcast recipient.
    pub async fn send_to(&self, id: SessionId, message: &str) -> bool {
        let mut sessions = self.sessions.lock().await;

        let Some(session) = sessions.get_mut(&id) else {
            return false;
        };

        let Err(e) = session.writer_mut().write_line(message).await else {
            return true;
        };

        warn!("Failed to reply to {}: {}", session.username(), e);
        if let Some(session) = sessions.remove(&id) {
            session.liveness().close();
        }
        false
    }

    /// Snapshot of the active usernames, sorted.
    pub async fn list_usernames(&self) -> Vec<String> {
        let sessions = self.sessions.lock().await;
        let mut names: Vec<String> = sessions
            .values()
            .map(|session| session.username().to_string())
            .collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
