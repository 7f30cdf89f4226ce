//! Chat response handling
//!
//! Defines the reserved prompt prefix and the text of every server line
//! that is not a relayed chat message.

use chrono::{DateTime, Local};

/// Prefix marking a server line that expects a reply during authentication
pub const AUTH_PREFIX: &str = "/auth ";

/// Prefix of every client command line
pub const COMMAND_PREFIX: char = '/';

pub const CHOOSE_ACTION: &str = "Choose action (1: Login, 2: Register):";
pub const ENTER_USERNAME: &str = "Enter username:";
pub const ENTER_NEW_USERNAME: &str = "Enter new username:";
pub const ENTER_PASSWORD: &str = "Enter password:";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Press Enter to continue.";

pub const GOODBYE: &str = "Goodbye!";
pub const FILE_USAGE: &str = "Usage: /file <filepath>";
pub const USERS_HEADER: &str = "Connected users:";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Available commands:";

/// One line per recognized command, shown in the welcome and help texts
pub const COMMAND_HELP: [&str; 3] = [
    "/file <filepath> - Send a file",
    "/users - List connected users",
    "/quit - Exit the chat",
];

/// Format an authentication prompt line
pub fn auth_prompt(text: &str) -> String {
    format!("{AUTH_PREFIX}{text}")
}

/// Render a chat message for broadcast, optionally stamped with the local time
pub fn format_chat_line(username: &str, text: &str, at: Option<DateTime<Local>>) -> String {
    match at {
        Some(at) => format!("[{}] {}: {}", at.format("%H:%M:%S"), username, text),
        None => format!("{}: {}", username, text),
    }
}

pub fn joined_notice(username: &str) -> String {
    format!("{username} has joined the chat!")
}

pub fn left_notice(username: &str) -> String {
    format!("{username} has left the chat!")
}

pub fn shared_file_notice(username: &str, display_name: &str) -> String {
    format!("{username} shared file: {display_name}")
}

/// Lines sent to a session right after it joins
pub fn welcome_lines(username: &str) -> Vec<String> {
    let mut lines = vec![format!("Welcome {username}! Commands available:")];
    lines.extend(COMMAND_HELP.iter().map(|line| line.to_string()));
    lines
}

/// Help listing sent in reply to an unrecognized command
pub fn help_text() -> String {
    let mut lines = vec![UNKNOWN_COMMAND];
    lines.extend(COMMAND_HELP);
    lines.join("\n")
}

/// Reply to `/users`
pub fn user_list(usernames: &[String]) -> String {
    let mut reply = String::from(USERS_HEADER);
    for name in usernames {
        reply.push_str("\n- ");
        reply.push_str(name);
    }
    reply
}

pub fn line_too_long(max: usize) -> String {
    format!("Message too long (max {max} bytes)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prompts_carry_reserved_prefix() {
        assert_eq!(auth_prompt(ENTER_USERNAME), "/auth Enter username:");
        assert!(auth_prompt(LOGIN_SUCCESS).starts_with(AUTH_PREFIX));
    }

    #[test]
    fn chat_line_without_timestamp() {
        assert_eq!(format_chat_line("alice", "hello", None), "alice: hello");
    }

    #[test]
    fn chat_line_with_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 3, 7).unwrap();
        assert_eq!(
            format_chat_line("bob", "hi there", Some(at)),
            "[09:03:07] bob: hi there"
        );
    }

    #[test]
    fn user_list_has_one_entry_per_line() {
        let reply = user_list(&["alice".to_string(), "bob".to_string()]);
        assert_eq!(reply, "Connected users:\n- alice\n- bob");
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        assert!(help.starts_with(UNKNOWN_COMMAND));
        for line in COMMAND_HELP {
            assert!(help.contains(line));
        }
    }
}
