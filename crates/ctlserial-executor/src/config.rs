use std::time::Duration;

/// Retries after the first attempt before a command is given up.
pub const DEFAULT_RETRY_LIMIT: u32 = 4;

/// Time each attempt may wait for its response.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for [`ControlSerial`](crate::ControlSerial).
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Re-sends allowed after the first attempt. `0` disables retrying.
    pub retry_limit: u32,
    /// Deadline for one attempt, from write until matching response.
    pub attempt_timeout: Duration,
    /// Route every raw frame and line to [`LogSink::wire`](crate::LogSink::wire).
    pub debug: bool,
    /// Interpret the first response value as a device status code.
    pub check_status: bool,
    /// Device reset behaviour.
    pub reset: ResetConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            debug: false,
            check_status: true,
            reset: ResetConfig::default(),
        }
    }
}

/// How [`ControlSerial::reset_device`](crate::ControlSerial::reset_device)
/// brings the device to a known state.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    /// How long the reset line stays asserted.
    pub pulse: Duration,
    /// Boot output is considered finished after this much silence.
    pub quiet_period: Duration,
    /// Upper bound on draining boot output.
    pub timeout: Duration,
    /// Line fragment the firmware prints once it accepts commands.
    /// When set, draining stops only when it is seen.
    pub ready_marker: Option<String>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            pulse: Duration::from_millis(100),
            quiet_period: Duration::from_millis(250),
            timeout: Duration::from_secs(3),
            ready_marker: None,
        }
    }
}
