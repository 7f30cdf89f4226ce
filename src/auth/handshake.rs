//! Authentication handshake
//!
//! Runs once per connection before the session may chat. Every line the
//! server sends here carries the `/auth ` prefix and expects exactly one
//! reply line. The handshake ends in one success or one failure; there is
//! no retry loop.

use log::info;
use tokio::io::AsyncBufRead;

use crate::auth::credentials::CredentialStore;
use crate::auth::results::{AuthMethod, AuthSuccess};
use crate::auth::validator::{validate_password, validate_username};
use crate::client::session::{IncomingLine, LineReader, LineWriter};
use crate::config::ServerConfig;
use crate::error::AuthError;
use crate::protocol::responses::{
    CHOOSE_ACTION, ENTER_NEW_USERNAME, ENTER_PASSWORD, ENTER_USERNAME, auth_prompt,
};

/// Runs the login/register exchange against the credential store.
///
/// The success line itself is not written here: it is sent as part of
/// admission to the registry, which can still refuse the session.
pub async fn authenticate<R>(
    reader: &mut LineReader<R>,
    writer: &mut LineWriter,
    credentials: &CredentialStore,
    config: &ServerConfig,
) -> Result<AuthSuccess, AuthError>
where
    R: AsyncBufRead + Unpin,
{
    let choice = prompt(reader, writer, CHOOSE_ACTION).await?;

    match parse_method(&choice) {
        AuthMethod::Register => register(reader, writer, credentials, config).await,
        AuthMethod::Login => login(reader, writer, credentials).await,
    }
}

/// "2" or "register" picks registration; any other answer is a login.
fn parse_method(choice: &str) -> AuthMethod {
    let choice = choice.trim();
    if choice == "2" || choice.eq_ignore_ascii_case("register") {
        AuthMethod::Register
    } else {
        AuthMethod::Login
    }
}

async fn prompt<R>(
    reader: &mut LineReader<R>,
    writer: &mut LineWriter,
    text: &str,
) -> Result<String, AuthError>
where
    R: AsyncBufRead + Unpin,
{
    writer.write_line(&auth_prompt(text)).await?;
    match reader.next_line().await? {
        Some(IncomingLine::Text(line)) => Ok(line),
        Some(IncomingLine::TooLong) => Err(AuthError::LineTooLong(reader.max_len())),
        None => Err(AuthError::Disconnected),
    }
}

async fn login<R>(
    reader: &mut LineReader<R>,
    writer: &mut LineWriter,
    credentials: &CredentialStore,
) -> Result<AuthSuccess, AuthError>
where
    R: AsyncBufRead + Unpin,
{
    let username = prompt(reader, writer, ENTER_USERNAME).await?;
    let password = prompt(reader, writer, ENTER_PASSWORD).await?;

    if !credentials.verify(&username, &password).await {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(AuthSuccess {
        username,
        method: AuthMethod::Login,
    })
}

async fn register<R>(
    reader: &mut LineReader<R>,
    writer: &mut LineWriter,
    credentials: &CredentialStore,
    config: &ServerConfig,
) -> Result<AuthSuccess, AuthError>
where
    R: AsyncBufRead + Unpin,
{
    let username = prompt(reader, writer, ENTER_NEW_USERNAME).await?;
    validate_username(&username, config)?;

    // Early answer for the common case; register() below is the real check
    if credentials.contains(&username).await {
        return Err(AuthError::UsernameTaken(username));
    }

    let password = prompt(reader, writer, ENTER_PASSWORD).await?;
    validate_password(&password, config)?;

    credentials.register(&username, &password).await?;
    info!(
        "Registered new user {} ({} registered)",
        username,
        credentials.count().await
    );

    Ok(AuthSuccess {
        username,
        method: AuthMethod::Register,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

    /// Feeds `input` as the client's replies and returns the outcome plus
    /// every line the server wrote.
    async fn run(input: &str, credentials: &CredentialStore) -> (Result<AuthSuccess, AuthError>, Vec<String>) {
        let config = ServerConfig::default();
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let mut reader = LineReader::new(BufReader::new(server_read), config.max_line_length);
        let mut writer = LineWriter::new(server_write);

        client.write_all(input.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        let result = authenticate(&mut reader, &mut writer, credentials, &config).await;
        drop(reader);
        drop(writer);

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        (result, output.lines().map(String::from).collect())
    }

    #[tokio::test]
    async fn register_new_user() {
        let credentials = CredentialStore::new();
        let (result, lines) = run("2\nalice\npw1\n", &credentials).await;

        let success = result.unwrap();
        assert_eq!(success.username, "alice");
        assert_eq!(success.method, AuthMethod::Register);
        assert_eq!(
            success.success_prompt(),
            "/auth Registration successful! Press Enter to continue."
        );
        assert_eq!(
            lines,
            vec![
                "/auth Choose action (1: Login, 2: Register):",
                "/auth Enter new username:",
                "/auth Enter password:",
            ]
        );
        assert!(credentials.verify("alice", "pw1").await);
    }

    #[tokio::test]
    async fn register_existing_user_fails_before_password() {
        let credentials = CredentialStore::new();
        credentials.register("alice", "pw1").await.unwrap();

        let (result, lines) = run("2\nalice\npw2\n", &credentials).await;

        assert!(matches!(result, Err(AuthError::UsernameTaken(ref u)) if u == "alice"));
        assert_eq!(lines.len(), 2);
        assert!(credentials.verify("alice", "pw1").await);
    }

    #[tokio::test]
    async fn register_rejects_malformed_username() {
        let credentials = CredentialStore::new();
        let (result, _) = run("2\nbad name\npw\n", &credentials).await;
        assert!(matches!(result, Err(AuthError::InvalidUsername(_))));
        assert_eq!(credentials.count().await, 0);
    }

    #[tokio::test]
    async fn login_with_correct_password() {
        let credentials = CredentialStore::new();
        credentials.register("bob", "hunter2").await.unwrap();

        let (result, lines) = run("1\nbob\nhunter2\r\n", &credentials).await;

        let success = result.unwrap();
        assert_eq!(success.username, "bob");
        assert_eq!(success.success_prompt(), "/auth Login successful!");
        assert_eq!(
            lines,
            vec![
                "/auth Choose action (1: Login, 2: Register):",
                "/auth Enter username:",
                "/auth Enter password:",
            ]
        );
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let credentials = CredentialStore::new();
        credentials.register("bob", "hunter2").await.unwrap();

        let (result, _) = run("1\nbob\nHunter2\n", &credentials).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_with_unknown_user_fails() {
        let credentials = CredentialStore::new();
        let (result, _) = run("1\nghost\nboo\n", &credentials).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn any_other_choice_means_login() {
        let credentials = CredentialStore::new();
        credentials.register("bob", "pw").await.unwrap();

        let (result, lines) = run("whatever\nbob\npw\n", &credentials).await;
        assert_eq!(result.unwrap().method, AuthMethod::Login);
        assert_eq!(lines[1], "/auth Enter username:");
    }

    #[tokio::test]
    async fn eof_mid_handshake_is_a_disconnect() {
        let credentials = CredentialStore::new();
        let (result, _) = run("2\ncarol\n", &credentials).await;
        assert!(matches!(result, Err(AuthError::Disconnected)));
        assert!(!credentials.contains("carol").await);
    }

    #[tokio::test]
    async fn over_long_answer_ends_the_handshake() {
        let credentials = CredentialStore::new();
        credentials.register("bob", "pw").await.unwrap();

        let flood = "x".repeat(10_000);
        let (result, lines) = run(&format!("1\n{flood}"), &credentials).await;

        assert!(matches!(result, Err(AuthError::LineTooLong(4096))));
        assert_eq!(lines.last().map(String::as_str), Some("/auth Enter username:"));
    }

    #[test]
    fn method_choice_parsing() {
        assert_eq!(parse_method("2"), AuthMethod::Register);
        assert_eq!(parse_method(" REGISTER "), AuthMethod::Register);
        assert_eq!(parse_method("1"), AuthMethod::Login);
        assert_eq!(parse_method(""), AuthMethod::Login);
    }
}
