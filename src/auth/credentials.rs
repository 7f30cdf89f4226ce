//! Credential storage and management
//!
//! In-memory username → password map shared by every session for the
//! lifetime of the process. Entries are only ever added; there is no update
//! or delete path. Passwords are kept as given.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::AuthError;

/// Shared credential store
#[derive(Default)]
pub struct CredentialStore {
    users: Mutex<HashMap<String, String>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the username has been registered.
    pub async fn contains(&self, username: &str) -> bool {
        self.users.lock().await.contains_key(username)
    }

    /// Checks a login attempt. Comparison is exact and case-sensitive.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        matches!(self.users.lock().await.get(username), Some(stored) if stored == password)
    }

    /// Registers a new user unless the name is already taken.
    ///
    /// The existence check and the insert happen under one lock, so of two
    /// concurrent registrations for the same name exactly one succeeds.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().await;
        if users.contains_key(username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    /// Number of registered users.
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}
