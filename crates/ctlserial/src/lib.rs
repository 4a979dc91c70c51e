//! Reliable command/response messaging between a host and a microcontroller.
//!
//! The host sends numbered, checksummed commands over a serial line; the
//! device answers each with a response carrying the same number, and may
//! print free-form log lines in between. ctlserial matches responses to
//! commands, retries lost or corrupted exchanges, and routes log output
//! separately.
//!
//! # Crate Structure
//!
//! - [`transport`]: line-oriented byte links (serial port behind the `serial` feature, TCP, Unix sockets)
//! - [`envelope`]: wire format, checksum and sequence numbering
//! - [`executor`]: the retrying [`ControlSerial`] command executor
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ctlserial::{ControlSerial, Value};
//!
//! let port = ctlserial::transport::open_serial("/dev/ttyACM0", 115_200)?;
//! let mut device = ControlSerial::new(port);
//! let reading = device.execute(0x61, &[Value::from(0)])?;
//! println!("{reading:?}");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use ctlserial_transport::*;
}

/// Re-export envelope types.
pub mod envelope {
    pub use ctlserial_envelope::*;
}

/// Re-export executor types.
pub mod executor {
    pub use ctlserial_executor::*;
}

pub use ctlserial_executor::{
    CommunicationError, ControlSerial, ExecuteError, ExecutorConfig, LogSink, ResetConfig, Value,
};
