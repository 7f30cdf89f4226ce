//! Client session plumbing
//!
//! Line-level read/write primitives over any async byte stream, and the
//! handle a session is represented by once it is admitted to the registry.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Notify;

/// Process-unique identity of a connection
pub type SessionId = u64;

/// One line as received from a client.
#[derive(Debug, PartialEq, Eq)]
pub enum IncomingLine {
    Text(String),
    /// Over the length limit; its contents were dropped.
    TooLong,
}

/// Reads client lines while buffering at most `max_len` bytes of each.
///
/// A line that crosses the limit is reported as `TooLong` as soon as the
/// limit is hit; whatever is left of it is skipped by the following read.
pub struct LineReader<R> {
    inner: R,
    max_len: usize,
    skipping: bool,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            max_len,
            skipping: false,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Reads the next line, without its `\n` or `\r\n` terminator.
    ///
    /// Returns `Ok(None)` at end of stream. Invalid UTF-8 surfaces as an
    /// `InvalidData` error.
    pub async fn next_line(&mut self) -> io::Result<Option<IncomingLine>> {
        if self.skipping {
            if !self.skip_line().await? {
                return Ok(None);
            }
            self.skipping = false;
        }

        // Longest accepted line plus `\r\n`
        let cap = self.max_len.saturating_add(2) as u64;
        let mut buf = Vec::new();
        let n = (&mut self.inner)
            .take(cap)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if n as u64 == cap {
            self.skipping = true;
            return Ok(Some(IncomingLine::TooLong));
        }

        if buf.len() > self.max_len {
            return Ok(Some(IncomingLine::TooLong));
        }

        String::from_utf8(buf)
            .map(|line| Some(IncomingLine::Text(line)))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Consumes input through the next `\n`. Returns false at end of stream.
    async fn skip_line(&mut self) -> io::Result<bool> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                return Ok(false);
            }

            let (used, found) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            self.inner.consume(used);
            if found {
                return Ok(true);
            }
        }
    }
}

/// Outgoing half of a connection, writing newline-terminated lines.
pub struct LineWriter {
    inner: Box<dyn AsyncWrite + Send + Unpin>,
}

impl LineWriter {
    pub fn new<W>(inner: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Writes one line and flushes it.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.inner.write_all(buf.as_bytes()).await?;
        self.inner.flush().await
    }

    pub async fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.write_line(line).await?;
        }
        Ok(())
    }

    /// Closes the outgoing direction of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }
}

/// Liveness flag shared between a session loop and the registry.
///
/// The registry clears it when a write to the session fails; the session
/// loop waits on it alongside its next read.
#[derive(Debug)]
pub struct Liveness {
    alive: AtomicBool,
    closed: Notify,
}

impl Default for Liveness {
    fn default() -> Self {
        Self {
            alive: AtomicBool::new(true),
            closed: Notify::new(),
        }
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Clears the flag. Returns false if it was already cleared.
    pub fn close(&self) -> bool {
        let was_alive = self.alive.swap(false, Ordering::AcqRel);
        if was_alive {
            // notify_one keeps a permit if nobody is waiting yet
            self.closed.notify_one();
        }
        was_alive
    }

    /// Resolves once the flag has been cleared.
    pub async fn closed(&self) {
        if !self.is_alive() {
            return;
        }
        self.closed.notified().await;
    }
}

/// A session as held by the registry: identity, username, and the
/// exclusively-owned outgoing stream.
pub struct SessionHandle {
    id: SessionId,
    username: String,
    writer: LineWriter,
    liveness: Arc<Liveness>,
}

impl SessionHandle {
    pub fn new(id: SessionId, username: String, writer: LineWriter, liveness: Arc<Liveness>) -> Self {
        Self {
            id,
            username,
            writer,
            liveness,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn writer_mut(&mut self) -> &mut LineWriter {
        &mut self.writer
    }

    /// Gives the outgoing stream back, e.g. to close it after removal.
    pub fn into_writer(self) -> LineWriter {
        self.writer
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("alive", &self.liveness.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::BufReader;

    fn text(line: &str) -> Option<IncomingLine> {
        Some(IncomingLine::Text(line.to_string()))
    }

    #[tokio::test]
    async fn next_line_strips_terminators() {
        let input: &[u8] = b"plain\nwindows\r\n\nlast";
        let mut reader = LineReader::new(BufReader::new(input), 64);

        assert_eq!(reader.next_line().await.unwrap(), text("plain"));
        assert_eq!(reader.next_line().await.unwrap(), text("windows"));
        assert_eq!(reader.next_line().await.unwrap(), text(""));
        assert_eq!(reader.next_line().await.unwrap(), text("last"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn next_line_rejects_invalid_utf8() {
        let input: &[u8] = b"\xff\xfe\n";
        let mut reader = LineReader::new(BufReader::new(input), 64);
        let err = reader.next_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let input: &[u8] = b"abcd\r\nabcd\n";
        let mut reader = LineReader::new(BufReader::new(input), 4);

        assert_eq!(reader.next_line().await.unwrap(), text("abcd"));
        assert_eq!(reader.next_line().await.unwrap(), text("abcd"));
    }

    #[tokio::test]
    async fn over_long_line_is_dropped_and_reading_resumes() {
        let input: &[u8] = b"abcde\nabcdefghijklmnop\nok\n";
        let mut reader = LineReader::new(BufReader::new(input), 4);

        assert_eq!(reader.next_line().await.unwrap(), Some(IncomingLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), Some(IncomingLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), text("ok"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unterminated_flood_is_reported_before_it_ends() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = LineReader::new(BufReader::new(server), 16);

        // Far more than the limit, no newline, stream left open
        client.write_all(&[b'x'; 512]).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), reader.next_line())
            .await
            .expect("limit was not enforced while the line was still open")
            .unwrap();
        assert_eq!(first, Some(IncomingLine::TooLong));

        client.write_all(b"yyyy\nafter\n").await.unwrap();
        assert_eq!(reader.next_line().await.unwrap(), text("after"));
    }

    #[tokio::test]
    async fn unterminated_flood_then_eof() {
        let input: &[u8] = b"abcdefghij";
        let mut reader = LineReader::new(BufReader::new(input), 4);

        assert_eq!(reader.next_line().await.unwrap(), Some(IncomingLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn writer_terminates_lines() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut writer = LineWriter::new(server);
        writer.write_line("hello").await.unwrap();
        writer
            .write_lines(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        writer.shutdown().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        assert_eq!(output, "hello\na\nb\n");
    }

    #[tokio::test]
    async fn writer_fails_once_peer_is_gone() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = LineWriter::new(server);
        drop(client);
        assert!(writer.write_line("anyone there?").await.is_err());
    }

    #[tokio::test]
    async fn liveness_close_wakes_waiter() {
        let liveness = Arc::new(Liveness::new());
        let waiter = {
            let liveness = Arc::clone(&liveness);
            tokio::spawn(async move { liveness.closed().await })
        };

        assert!(liveness.close());
        assert!(!liveness.close());
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter was not woken")
            .unwrap();
    }

    #[tokio::test]
    async fn liveness_closed_before_wait_resolves_immediately() {
        let liveness = Liveness::new();
        liveness.close();
        tokio::time::timeout(Duration::from_secs(1), liveness.closed())
            .await
            .expect("closed() should not block");
    }
}
