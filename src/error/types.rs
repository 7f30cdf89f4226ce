//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;

use crate::client::SessionHandle;
use crate::client::state::SessionState;

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    UsernameTaken(String),
    InvalidUsername(String),
    InvalidPassword,
    AlreadyActive(String),
    LineTooLong(usize),
    Disconnected,
    Io(io::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::UsernameTaken(u) => write!(f, "Username already exists: {}", u),
            AuthError::InvalidUsername(u) => write!(f, "Invalid username: {:?}", u),
            AuthError::InvalidPassword => write!(f, "Invalid password format"),
            AuthError::AlreadyActive(u) => write!(f, "User already logged in: {}", u),
            AuthError::LineTooLong(max) => write!(f, "Answer longer than {} bytes", max),
            AuthError::Disconnected => write!(f, "Client disconnected during authentication"),
            AuthError::Io(e) => write!(f, "I/O error during authentication: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(error: io::Error) -> Self {
        AuthError::Io(error)
    }
}

/// Session registry errors
///
/// A rejected admission hands the session back so the caller can still
/// report the failure on its stream and close it.
#[derive(Debug)]
pub enum RegistryError {
    UsernameActive(SessionHandle),
    Transport(io::Error),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UsernameActive(session) => {
                write!(f, "Username already active: {}", session.username())
            }
            RegistryError::Transport(e) => write!(f, "Failed to greet session: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Session lifecycle errors
#[derive(Debug)]
pub enum SessionError {
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidTransition { from, to } => {
                write!(f, "Invalid session transition: {:?} -> {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Transfer module errors
#[derive(Debug)]
pub enum TransferError {
    InvalidPath(String),
    NameTooLong(usize),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            TransferError::NameTooLong(max) => {
                write!(f, "File name too long (max {} bytes)", max)
            }
        }
    }
}

impl std::error::Error for TransferError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Auth(AuthError),
    Session(SessionError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Auth(e) => write!(f, "Authentication error: {}", e),
            ChatServerError::Session(e) => write!(f, "Session error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

// Implement conversions from specific errors to ChatServerError
impl From<AuthError> for ChatServerError {
    fn from(error: AuthError) -> Self {
        ChatServerError::Auth(error)
    }
}

impl From<SessionError> for ChatServerError {
    fn from(error: SessionError) -> Self {
        ChatServerError::Session(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::Io(error)
    }
}
