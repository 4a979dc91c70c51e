use std::io::{self, Read, Write};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// The byte link the command executor drives.
///
/// Implementations own the underlying handle exclusively; dropping the
/// transport releases it.
pub trait Transport {
    /// Write a complete frame (blocking until every byte is accepted).
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read the next line without its terminator.
    ///
    /// Returns [`TransportError::Timeout`] when no complete line arrives
    /// within `timeout`.
    fn read_line(&mut self, timeout: Duration) -> Result<String>;

    /// Drive the device reset line into its active state.
    fn assert_reset(&mut self) -> Result<()>;

    /// Return the device reset line to its idle state.
    fn release_reset(&mut self) -> Result<()>;

    /// Discard every byte received but not yet consumed.
    fn flush_input(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<String> {
        (**self).read_line(timeout)
    }

    fn assert_reset(&mut self) -> Result<()> {
        (**self).assert_reset()
    }

    fn release_reset(&mut self) -> Result<()> {
        (**self).release_reset()
    }

    fn flush_input(&mut self) -> Result<()> {
        (**self).flush_input()
    }
}

/// A raw byte stream that [`LineTransport`](crate::LineTransport) can frame
/// into lines.
///
/// Serial ports, TCP bridges (ser2net and friends) and Unix sockets all
/// implement `Read + Write`; this trait adds the few control operations the
/// line layer needs on top.
pub trait SerialStream: Read + Write {
    /// Bound the next blocking read. `timeout` is never zero.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Set the reset control line. Streams without one report
    /// [`TransportError::Unsupported`].
    fn set_reset(&mut self, asserted: bool) -> Result<()> {
        let _ = asserted;
        Err(TransportError::Unsupported("device reset"))
    }

    /// Drop bytes held in driver or OS buffers.
    fn clear_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialStream for std::net::TcpStream {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        std::net::TcpStream::set_read_timeout(self, Some(timeout))
    }
}

#[cfg(unix)]
impl SerialStream for std::os::unix::net::UnixStream {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        std::os::unix::net::UnixStream::set_read_timeout(self, Some(timeout))
    }
}
