//! Command handlers module for the Rax chat server.
//!
//! Turns a parsed command into a `CommandResult`. Handlers never write to
//! a stream themselves; the session loop delivers `message` to the issuer
//! and `broadcast` to everyone.

use log::{info, warn};

use crate::client::SessionRegistry;
use crate::protocol::responses::{
    FILE_USAGE, GOODBYE, help_text, shared_file_notice, user_list,
};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::server::SharedState;
use crate::transfer::FileTransfer;

/// Dispatches a command issued by `username` to its handler.
pub async fn handle_command(command: &Command, username: &str, state: &SharedState) -> CommandResult {
    match command {
        Command::Users => handle_cmd_users(&state.registry).await,
        Command::Quit => handle_cmd_quit(username),
        Command::File(path) => handle_cmd_file(username, path.as_deref(), state.transfer.as_ref()),
        Command::Unknown(word) => handle_cmd_unknown(word),
    }
}

/// Handles `/users`: replies with the active usernames.
async fn handle_cmd_users(registry: &SessionRegistry) -> CommandResult {
    let usernames = registry.list_usernames().await;
    CommandResult::reply(CommandStatus::Success, user_list(&usernames))
}

/// Handles `/quit`: signals the session loop to close.
fn handle_cmd_quit(username: &str) -> CommandResult {
    info!("{} requested to quit", username);
    CommandResult::reply(CommandStatus::CloseConnection, GOODBYE)
}

/// Handles `/file`: asks the transfer collaborator and announces the result.
fn handle_cmd_file(username: &str, path: Option<&str>, transfer: &dyn FileTransfer) -> CommandResult {
    let Some(path) = path else {
        return CommandResult::reply(CommandStatus::Failure("Missing file path".into()), FILE_USAGE);
    };

    match transfer.transfer(username, path) {
        Ok(receipt) => {
            info!("{} shared file: {}", username, receipt.display_name);
            CommandResult::broadcast(shared_file_notice(username, &receipt.display_name))
        }
        Err(e) => {
            warn!("File transfer error from {}: {}", username, e);
            CommandResult::reply(
                CommandStatus::Failure(e.to_string()),
                format!("Error sending file: {e}"),
            )
        }
    }
}

/// Handles unknown commands: replies with the command list.
fn handle_cmd_unknown(word: &str) -> CommandResult {
    CommandResult::reply(
        CommandStatus::Failure(format!("Unknown command {word}")),
        help_text(),
    )
}
