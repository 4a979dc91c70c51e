//! Line-oriented byte transports for ctlserial.
//!
//! The device link is a plain byte stream on which every protocol frame and
//! every diagnostic message occupies one `\r\n` (or `\n`) terminated line.
//! This crate provides:
//! - the [`Transport`] contract the command executor drives
//! - [`LineTransport`], a buffered line reader/writer over any [`SerialStream`]
//! - stream openers for serial ports (`serial` feature), TCP bridges and
//!   Unix domain sockets
//!
//! This is the lowest layer of ctlserial. Everything else builds on top of
//! the [`Transport`] trait provided here.

pub mod error;
pub mod line;
pub mod net;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use line::{
    deadline_after, LineConfig, LineTransport, DEFAULT_MAX_LINE_LEN, DEFAULT_POLL_INTERVAL, MAX_WAIT,
};
pub use net::connect_tcp;
pub use traits::{SerialStream, Transport};

#[cfg(feature = "serial")]
pub use serial::{open_serial, SerialTransport, DEFAULT_BAUD_RATE};
