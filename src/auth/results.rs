//! Authentication result types
//!
//! Defines result structures returned by authentication operations.

use crate::protocol::responses::{LOGIN_SUCCESS, REGISTRATION_SUCCESS, auth_prompt};

/// Which branch of the handshake the client chose
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthMethod {
    Login,
    Register,
}

/// Result of a successful handshake
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSuccess {
    pub username: String,
    pub method: AuthMethod,
}

impl AuthSuccess {
    /// The `/auth` line confirming success, written when the session is admitted
    pub fn success_prompt(&self) -> String {
        match self.method {
            AuthMethod::Login => auth_prompt(LOGIN_SUCCESS),
            AuthMethod::Register => auth_prompt(REGISTRATION_SUCCESS),
        }
    }
}
