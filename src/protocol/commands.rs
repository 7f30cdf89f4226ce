//! Module `commands`
//!
//! Defines the chat command parsing logic and the data structures used to
//! represent commands and the outcome of dispatching them.

/// A `/`-prefixed command line parsed from client input.
#[derive(Debug, PartialEq)]
pub enum Command {
    Users,
    Quit,
    File(Option<String>), // Path argument, if one was given
    Unknown(String),      // Command word as typed
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
///
/// `message` goes to the issuing session only; `broadcast` goes to every
/// registered session.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
    pub broadcast: Option<String>,
}

impl CommandResult {
    pub fn reply(status: CommandStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            broadcast: None,
        }
    }

    pub fn broadcast(line: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
            broadcast: Some(line.into()),
        }
    }
}

/// Parses a raw command line into the `Command` enum.
///
/// Only the command word is case-insensitive; arguments are kept verbatim
/// apart from surrounding whitespace.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (trimmed, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "/users" => Command::Users,
        "/quit" => Command::Quit,
        "/file" if arg.is_empty() => Command::File(None),
        "/file" => Command::File(Some(arg.to_string())),
        _ => Command::Unknown(word.to_string()),
    }
}

/// Returns true when the line should be routed to the command dispatcher.
pub fn is_command(line: &str) -> bool {
    line.starts_with(super::responses::COMMAND_PREFIX)
}
