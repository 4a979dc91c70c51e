use tracing::{debug, info};

/// Which way a line travelled on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Receives device output that is not a command result.
///
/// Called inline from the executor's read loop, in arrival order.
pub trait LogSink {
    /// A diagnostic line emitted by the device.
    fn log_message(&mut self, text: &str);

    /// Raw traffic, only called while debug mode is on.
    fn wire(&mut self, direction: Direction, line: &str) {
        let _ = (direction, line);
    }
}

/// Forwards device output to `tracing`.
///
/// Log messages are `info` events with target `ctlserial::device`; debug
/// traffic is `debug` events with target `ctlserial::wire`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log_message(&mut self, text: &str) {
        info!(target: "ctlserial::device", "{text}");
    }

    fn wire(&mut self, direction: Direction, line: &str) {
        debug!(target: "ctlserial::wire", ?direction, line);
    }
}

impl<F: FnMut(&str)> LogSink for F {
    fn log_message(&mut self, text: &str) {
        self(text)
    }
}
