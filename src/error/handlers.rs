//! Error handlers
//!
//! Provides error reporting and translation to wire responses.

use crate::error::types::{AuthError, ChatServerError};
use crate::protocol::responses::{auth_prompt, line_too_long};
use log::error;

/// Handle a top-level chat server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Convert an authentication error to the `/auth` line reported to the client.
///
/// Returns `None` when the stream is already unusable.
pub fn auth_error_to_prompt(err: &AuthError) -> Option<String> {
    let text = match err {
        AuthError::InvalidCredentials => "Invalid credentials!",
        AuthError::UsernameTaken(_) => "Username already exists!",
        AuthError::InvalidUsername(_) => "Invalid username!",
        AuthError::InvalidPassword => "Invalid password!",
        AuthError::AlreadyActive(_) => "User already logged in!",
        AuthError::LineTooLong(max) => return Some(auth_prompt(&line_too_long(*max))),
        AuthError::Disconnected | AuthError::Io(_) => return None,
    };
    Some(auth_prompt(text))
}
