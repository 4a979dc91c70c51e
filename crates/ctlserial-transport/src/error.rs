use std::time::Duration;

/// Errors that can occur on the byte link to the device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named port or bridge address.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No complete line arrived before the deadline.
    #[error("no line received within {0:?}")]
    Timeout(Duration),

    /// The stream reached end-of-file or refused further writes.
    #[error("transport closed")]
    Closed,

    /// The stream does not support the requested control operation.
    #[error("{0} is not supported by this transport")]
    Unsupported(&'static str),
}

impl TransportError {
    /// Whether this error is a read deadline rather than a link failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
