use std::fmt;
use std::time::Duration;

use ctlserial_envelope::ValidationError;
use ctlserial_transport::TransportError;

/// Transient reasons an attempt did not resolve. Counted against the retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// No matching response within the attempt timeout.
    Timeout,
    /// A response arrived with a checksum that does not verify.
    ChecksumMismatch,
    /// A line claimed to be a response but could not be parsed.
    Malformed(String),
    /// The device answered with a negative status, asking for a resend.
    DeviceBusy(i64),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Timeout => write!(f, "timeout"),
            FailureCause::ChecksumMismatch => write!(f, "checksum mismatch"),
            FailureCause::Malformed(reason) => write!(f, "malformed response ({reason})"),
            FailureCause::DeviceBusy(code) => write!(f, "device busy (status {code})"),
        }
    }
}

/// Terminal failures talking to the device.
#[derive(Debug, thiserror::Error)]
pub enum CommunicationError {
    /// Every attempt failed; carries the cause of the last one.
    #[error("command failed after {attempts} attempts: {cause}")]
    RetriesExhausted { attempts: u32, cause: FailureCause },

    /// The link itself failed. Never retried.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The configured ready marker did not appear after a reset.
    #[error("device not ready within {0:?} after reset")]
    ResetTimeout(Duration),
}

impl CommunicationError {
    /// The last transient cause, when retries ran out.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            CommunicationError::RetriesExhausted { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Errors returned by [`ControlSerial::execute`](crate::ControlSerial::execute).
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The command was rejected before anything was written.
    #[error("invalid command: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Communication(#[from] CommunicationError),

    /// The device executed the command and reported a failure status.
    #[error(
        "device reported status {code}: {}",
        .message.as_deref().unwrap_or("no message")
    )]
    Device { code: i64, message: Option<String> },
}

pub type Result<T> = std::result::Result<T, ExecuteError>;
