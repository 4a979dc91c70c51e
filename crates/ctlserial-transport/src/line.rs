use std::io::ErrorKind;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use tracing::{trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{SerialStream, Transport};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// Default upper bound on a single line before it is cut: 1 KiB.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Default granularity of blocking reads while waiting for a line.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cap applied to waits whose deadline would not fit an `Instant`.
pub const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `now + timeout`, clamped so arbitrarily large timeouts never overflow.
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(MAX_WAIT))
        .unwrap_or(now)
}

/// Configuration for the line layer.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Lines longer than this are handed out in pieces of this size.
    pub max_line_len: usize,
    /// Maximum duration of one blocking read on the inner stream.
    pub poll_interval: Duration,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Reads and writes newline-delimited text over any [`SerialStream`].
///
/// Handles partial reads internally, so callers always get complete lines,
/// with the trailing `\n` and an optional preceding `\r` removed.
pub struct LineTransport<S> {
    inner: S,
    buf: BytesMut,
    config: LineConfig,
}

impl<S: SerialStream> LineTransport<S> {
    /// Wrap a stream with default configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Wrap a stream with explicit configuration.
    pub fn with_config(inner: S, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    ///
    /// Bytes already buffered but not yet returned as a line are lost.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Current line layer configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Number of buffered bytes not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn take_line(&mut self) -> Option<String> {
        if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            return Some(String::from_utf8_lossy(&line).into_owned());
        }

        if self.buf.len() >= self.config.max_line_len {
            warn!(
                max = self.config.max_line_len,
                "line exceeds maximum length, splitting"
            );
            let piece = self.buf.split_to(self.config.max_line_len);
            return Some(String::from_utf8_lossy(&piece).into_owned());
        }

        None
    }

    fn fill(&mut self, wait: Duration) -> Result<()> {
        self.inner.set_read_timeout(wait.max(MIN_READ_TIMEOUT))?;

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        match self.inner.read(&mut chunk) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => {
                self.buf.extend_from_slice(&chunk[..n]);
                Ok(())
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                ) =>
            {
                Ok(())
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

impl<S: SerialStream> Transport for LineTransport<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn read_line(&mut self, timeout: Duration) -> Result<String> {
        let deadline = deadline_after(timeout);
        loop {
            if let Some(line) = self.take_line() {
                trace!(len = line.len(), "line received");
                return Ok(line);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(TransportError::Timeout(timeout));
            }
            self.fill((deadline - now).min(self.config.poll_interval))?;
        }
    }

    fn assert_reset(&mut self) -> Result<()> {
        self.inner.set_reset(true)
    }

    fn release_reset(&mut self) -> Result<()> {
        self.inner.set_reset(false)
    }

    fn flush_input(&mut self) -> Result<()> {
        let dropped = self.buf.remaining();
        self.buf.clear();
        self.inner.clear_input()?;
        trace!(dropped, "input flushed");
        Ok(())
    }
}

impl<S> std::fmt::Debug for LineTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTransport")
            .field("buffered", &self.buf.len())
            .field("config", &self.config)
            .finish()
    }
}
