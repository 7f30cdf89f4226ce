use chrono::Local;
use log::{debug, info, warn};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, BufReader};

use crate::auth::authenticate;
use crate::client::session::{
    IncomingLine, LineReader, LineWriter, Liveness, SessionHandle, SessionId,
};
use crate::client::state::Session;
use crate::error::handlers::{auth_error_to_prompt, handle_error};
use crate::error::{AuthError, ChatServerError, RegistryError};
use crate::protocol::responses::{
    format_chat_line, joined_notice, left_notice, line_too_long, welcome_lines,
};
use crate::protocol::{CommandStatus, handle_command, is_command, parse_command};
use crate::server::SharedState;

/// Why an active session ended.
#[derive(Debug)]
enum CloseReason {
    Quit,
    EndOfStream,
    ReadError(io::Error),
    Evicted,
}

/// What to do after handling one line.
enum LineOutcome {
    Continue,
    Quit,
}

/// Runs one connection from first byte to close.
///
/// - Authenticates the client; failures are reported and the stream closed.
/// - Admits the session to the registry and announces it.
/// - Relays chat lines and dispatches commands until EOF, error, `/quit`,
///   or eviction after a failed write.
/// - Removes the session and announces the departure.
pub async fn handle_connection<S>(stream: S, peer: String, state: SharedState)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    if let Err(e) = run_session(stream, peer, &state).await {
        handle_error(&e);
    }
}

async fn run_session<S>(stream: S, peer: String, state: &SharedState) -> Result<(), ChatServerError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = LineReader::new(BufReader::new(read_half), state.config.max_line_length);
    let mut writer = LineWriter::new(write_half);
    let mut session = Session::new(state.registry.next_session_id(), peer);

    info!("New connection from {}", session.peer());
    session.begin_authentication()?;

    let auth = match authenticate(&mut reader, &mut writer, &state.credentials, &state.config).await {
        Ok(auth) => auth,
        Err(e) => {
            reject(&mut session, writer, &e).await;
            return Ok(());
        }
    };

    let liveness = Arc::new(Liveness::new());
    let handle = SessionHandle::new(
        session.id(),
        auth.username.clone(),
        writer,
        Arc::clone(&liveness),
    );

    match state.registry.add(handle, &[auth.success_prompt()]).await {
        Ok(()) => {}
        Err(RegistryError::UsernameActive(handle)) => {
            let err = AuthError::AlreadyActive(auth.username);
            reject(&mut session, handle.into_writer(), &err).await;
            return Ok(());
        }
        Err(RegistryError::Transport(e)) => {
            warn!("{} disconnected before joining: {}", session.peer(), e);
            session.close();
            return Ok(());
        }
    }

    session.activate(&auth.username)?;
    let username = auth.username.as_str();
    info!(
        "{} has joined the chat from {} ({} active)",
        username,
        session.peer(),
        state.registry.len().await
    );

    state.registry.broadcast(&joined_notice(username)).await;
    state
        .registry
        .send_to(session.id(), &welcome_lines(username).join("\n"))
        .await;

    let reason = message_loop(&mut reader, session.id(), username, &liveness, state).await;
    close_session(&mut session, reason, state).await;
    Ok(())
}

/// Reports a failed handshake and closes the stream without registering.
async fn reject(session: &mut Session, mut writer: LineWriter, err: &AuthError) {
    info!("Authentication failed for {}: {}", session.peer(), err);

    if let Some(line) = auth_error_to_prompt(err) {
        if let Err(e) = writer.write_line(&line).await {
            debug!("Could not report auth failure to {}: {}", session.peer(), e);
        }
    }
    if let Err(e) = writer.shutdown().await {
        debug!("Error closing stream for {}: {}", session.peer(), e);
    }
    session.close();
}

async fn message_loop<R>(
    reader: &mut LineReader<R>,
    id: SessionId,
    username: &str,
    liveness: &Liveness,
    state: &SharedState,
) -> CloseReason
where
    R: AsyncBufRead + Unpin,
{
    loop {
        // A read cancelled by eviction loses at most the line being read,
        // and the session is closing anyway.
        let line = tokio::select! {
            read = reader.next_line() => match read {
                Ok(Some(IncomingLine::Text(line))) => line,
                Ok(Some(IncomingLine::TooLong)) => {
                    let reply = line_too_long(reader.max_len());
                    state.registry.send_to(id, &reply).await;
                    continue;
                }
                Ok(None) => return CloseReason::EndOfStream,
                Err(e) => return CloseReason::ReadError(e),
            },
            _ = liveness.closed() => return CloseReason::Evicted,
        };

        if let LineOutcome::Quit = handle_line(&line, id, username, state).await {
            return CloseReason::Quit;
        }
    }
}

async fn handle_line(line: &str, id: SessionId, username: &str, state: &SharedState) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Continue;
    }

    if !is_command(line) {
        info!("{}: {}", username, line);
        let stamp = state.config.timestamps.then(Local::now);
        state
            .registry
            .broadcast(&format_chat_line(username, line, stamp))
            .await;
        return LineOutcome::Continue;
    }

    let command = parse_command(line);
    debug!("Received from {}: {:?}", username, command);

    let result = handle_command(&command, username, state).await;

    if let CommandStatus::Failure(reason) = &result.status {
        debug!("Command from {} failed: {}", username, reason);
    }
    if let Some(message) = &result.message {
        state.registry.send_to(id, message).await;
    }
    if let Some(line) = &result.broadcast {
        state.registry.broadcast(line).await;
    }

    match result.status {
        CommandStatus::CloseConnection => LineOutcome::Quit,
        _ => LineOutcome::Continue,
    }
}

/// Tears down an active session: deregisters it, closes its stream, and
/// tells everyone else it left.
async fn close_session(session: &mut Session, reason: CloseReason, state: &SharedState) {
    let username = session.username().unwrap_or_default().to_string();
    debug!(
        "Closing session {} ({:?}) from {:?}",
        session.id(),
        reason,
        session.state()
    );

    match &reason {
        CloseReason::Quit => info!("{} quit", username),
        CloseReason::EndOfStream => info!("Connection closed by {}", username),
        CloseReason::ReadError(e) => warn!("{} disconnected due to error: {}", username, e),
        CloseReason::Evicted => warn!("{} dropped after a failed write", username),
    }

    if let Some(handle) = state.registry.remove(session.id()).await {
        let mut writer = handle.into_writer();
        if let Err(e) = writer.shutdown().await {
            debug!("Error closing stream for {}: {}", username, e);
        }
    }

    let report = state.registry.broadcast(&left_notice(&username)).await;
    if !report.failed.is_empty() {
        warn!(
            "Leave notice for {} failed for {} session(s)",
            username,
            report.failed.len()
        );
    }

    session.close();
    info!(
        "{} has left the chat ({} active)",
        username,
        state.registry.len().await
    );
}
