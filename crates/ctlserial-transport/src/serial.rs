use std::io;
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::line::{LineTransport, DEFAULT_POLL_INTERVAL};
use crate::traits::SerialStream;

/// Baud rate used by the reference device firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// A line transport over a local serial port.
pub type SerialTransport = LineTransport<Box<dyn SerialPort>>;

/// Open a serial port as 8N1 without flow control.
pub fn open_serial(port: &str, baud_rate: u32) -> Result<SerialTransport> {
    let stream = serialport::new(port, baud_rate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .flow_control(FlowControl::None)
        .timeout(DEFAULT_POLL_INTERVAL)
        .open()
        .map_err(|source| TransportError::Open {
            port: port.to_string(),
            source: source.into(),
        })?;

    info!(port, baud_rate, "opened serial port");
    Ok(LineTransport::new(stream))
}

impl SerialStream for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }

    // Boards with an auto-reset circuit restart on the DTR edge: dropping DTR
    // holds the reset, raising it again lets the bootloader run.
    fn set_reset(&mut self, asserted: bool) -> Result<()> {
        debug!(asserted, "toggling DTR");
        self.write_data_terminal_ready(!asserted)
            .map_err(|err| TransportError::Io(err.into()))
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}
