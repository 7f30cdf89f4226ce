//! Registration input validation
//!
//! Usernames end up inside broadcast lines and `/users` listings, so they
//! are restricted to a single printable token.

use crate::config::ServerConfig;
use crate::error::AuthError;

/// Performs basic input sanitation shared by usernames and passwords.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.is_empty() && input.len() <= max_length && !input.contains(char::is_control)
}

/// Validates a username offered for registration.
pub fn validate_username(username: &str, config: &ServerConfig) -> Result<(), AuthError> {
    if !is_valid_input(username, config.max_username_length)
        || username.contains(char::is_whitespace)
        || username.starts_with('/')
    {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Validates a password offered for registration.
pub fn validate_password(password: &str, config: &ServerConfig) -> Result<(), AuthError> {
    if !is_valid_input(password, config.max_password_length) {
        return Err(AuthError::InvalidPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        let config = ServerConfig::default();
        for name in ["alice", "bob_2", "Zoë", "x"] {
            assert!(validate_username(name, &config).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        let config = ServerConfig::default();
        let too_long = "a".repeat(config.max_username_length + 1);
        for name in ["", "two words", "/users", "tab\there", "nul\0", too_long.as_str()] {
            assert!(
                matches!(
                    validate_username(name, &config),
                    Err(AuthError::InvalidUsername(_))
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn passwords_may_contain_spaces_but_not_controls() {
        let config = ServerConfig::default();
        assert!(validate_password("correct horse battery", &config).is_ok());
        assert!(validate_password("", &config).is_err());
        assert!(validate_password("bell\x07", &config).is_err());
    }
}
