//! Resilient command execution for microcontroller-class devices.
//!
//! This is the "just works" layer: [`ControlSerial`] encodes a command,
//! writes it, reads lines until the response carrying the same sequence
//! number arrives, forwards interleaved device log output to a [`LogSink`],
//! and retries on timeouts and corrupted replies.

pub mod config;
pub mod error;
pub mod executor;
pub mod reset;
pub mod sink;

pub use config::{ExecutorConfig, ResetConfig, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_RETRY_LIMIT};
pub use error::{CommunicationError, ExecuteError, FailureCause, Result};
pub use executor::{ControlSerial, ExecutorStats};
pub use sink::{Direction, LogSink, TracingLogSink};

pub use ctlserial_envelope::{ValidationError, Value};
pub use ctlserial_transport::{Transport, TransportError};
