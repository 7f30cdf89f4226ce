//! Module `state`
//!
//! Per-connection lifecycle: `Connecting → Authenticating → Active → Closed`.

use crate::client::session::SessionId;
use crate::error::SessionError;

/// Lifecycle stage of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Active,
    Closed,
}

impl SessionState {
    fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connecting, Authenticating)
                | (Connecting, Closed)
                | (Authenticating, Active)
                | (Authenticating, Closed)
                | (Active, Closed)
        )
    }
}

/// Represents the state of one connection as seen by its own session loop.
///
/// The username is assigned once, on the move to `Active`, and never changes.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    peer: String,
    username: Option<String>,
    state: SessionState,
}

impl Session {
    pub fn new(id: SessionId, peer: impl Into<String>) -> Self {
        Self {
            id,
            peer: peer.into(),
            username: None,
            state: SessionState::Connecting,
        }
    }

    pub fn begin_authentication(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Authenticating)
    }

    /// Moves to `Active` under the authenticated username.
    pub fn activate(&mut self, username: &str) -> Result<(), SessionError> {
        self.transition(SessionState::Active)?;
        self.username = Some(username.to_string());
        Ok(())
    }

    /// Moves to `Closed`. Returns false if the session was already closed.
    pub fn close(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }

    fn transition(&mut self, next: SessionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Remote address or other label of the connection, for logs.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let mut session = Session::new(1, "127.0.0.1:5000");
        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(session.peer(), "127.0.0.1:5000");

        session.begin_authentication().unwrap();
        session.activate("alice").unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.username(), Some("alice"));

        assert!(session.close());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn failed_authentication_closes_without_username() {
        let mut session = Session::new(2, "peer");
        session.begin_authentication().unwrap();
        assert!(session.close());
        assert_eq!(session.username(), None);
    }

    #[test]
    fn cannot_activate_without_authenticating() {
        let mut session = Session::new(3, "peer");
        let err = session.activate("mallory").unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: SessionState::Connecting,
                to: SessionState::Active
            }
        ));
        assert_eq!(session.username(), None);
    }

    #[test]
    fn closed_is_terminal() {
        let mut session = Session::new(4, "peer");
        session.begin_authentication().unwrap();
        session.activate("alice").unwrap();
        assert!(session.close());
        assert!(!session.close());
        assert!(session.begin_authentication().is_err());
        assert!(session.activate("bob").is_err());
        assert_eq!(session.username(), Some("alice"));
    }
}
