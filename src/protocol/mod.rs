//! Chat protocol implementation
//!
//! Handles command parsing, dispatch, and response text.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, is_command, parse_command};
pub use handlers::handle_command;
