use std::time::Duration;

use clap::{Args, Subcommand};
use ctlserial_executor::{ControlSerial, ExecutorConfig, Transport};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod exec;
pub mod monitor;
pub mod reset;
pub mod version;

/// Transport the executor runs over.
pub type Link = Box<dyn Transport>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute one command and print its result values.
    Exec(ExecArgs),
    /// Pulse the device reset line and wait for it to boot.
    Reset(ResetArgs),
    /// Print every line the device sends.
    Monitor(MonitorArgs),
    /// Show version information.
    Version(VersionArgs),
}

impl Command {
    /// Whether raw traffic was requested with `--debug`.
    pub fn wire_debug(&self) -> bool {
        match self {
            Command::Exec(args) => args.link.debug,
            Command::Reset(args) => args.link.debug,
            Command::Monitor(args) => args.link.debug,
            Command::Version(_) => false,
        }
    }
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Exec(args) => exec::run(args, format),
        Command::Reset(args) => reset::run(args),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial port the device is attached to.
    #[arg(long, short = 'p', env = "CTLSERIAL_PORT", conflicts_with = "tcp")]
    pub port: Option<String>,
    /// Serial baud rate.
    #[arg(long, short = 'b', env = "CTLSERIAL_BAUD", default_value_t = ctlserial_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// TCP serial bridge address (host:port) instead of a local port.
    #[arg(long, env = "CTLSERIAL_TCP")]
    pub tcp: Option<String>,
    /// Re-sends allowed after the first attempt.
    #[arg(long, default_value_t = ctlserial_executor::DEFAULT_RETRY_LIMIT)]
    pub retries: u32,
    /// Time each attempt waits for its response (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
    /// Mirror raw traffic as debug-level `ctlserial::wire` logs.
    #[arg(long)]
    pub debug: bool,
    /// Return response values as-is, without interpreting a status code.
    #[arg(long)]
    pub no_status: bool,
}

impl LinkArgs {
    pub fn executor_config(&self) -> CliResult<ExecutorConfig> {
        Ok(ExecutorConfig {
            retry_limit: self.retries,
            attempt_timeout: parse_duration(&self.timeout)?,
            debug: self.debug,
            check_status: !self.no_status,
            ..ExecutorConfig::default()
        })
    }

    pub fn open(&self) -> CliResult<Link> {
        if let Some(addr) = &self.tcp {
            let link = ctlserial_transport::connect_tcp(addr)
                .map_err(|err| transport_error("connect failed", err))?;
            return Ok(Box::new(link));
        }
        if let Some(port) = &self.port {
            let link = ctlserial_transport::open_serial(port, self.baud)
                .map_err(|err| transport_error("open failed", err))?;
            return Ok(Box::new(link));
        }
        Err(CliError::new(
            USAGE,
            "no device given: pass --port or --tcp (or set CTLSERIAL_PORT / CTLSERIAL_TCP)",
        ))
    }

    pub fn connect(&self) -> CliResult<ControlSerial<Link>> {
        let config = self.executor_config()?;
        Ok(ControlSerial::with_config(self.open()?, config))
    }
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Opcode: decimal, 0x-prefixed hex, or a single character.
    pub opcode: String,
    /// Arguments; integers where they parse, strings otherwise.
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Line fragment the firmware prints once it accepts commands.
    #[arg(long, value_name = "MARKER")]
    pub ready: Option<String>,
    /// How long the reset line is held (e.g. 100ms).
    #[arg(long, default_value = "100ms")]
    pub pulse: String,
    /// Upper bound on waiting for the device to boot (e.g. 3s).
    #[arg(long, default_value = "3s")]
    pub wait: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after printing N lines.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> LinkArgs {
        LinkArgs {
            port: None,
            baud: 115_200,
            tcp: None,
            retries: 2,
            timeout: "250ms".to_string(),
            debug: true,
            no_status: true,
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn link_flags_shape_executor_config() {
        let config = link().executor_config().unwrap();
        assert_eq!(config.retry_limit, 2);
        assert_eq!(config.attempt_timeout, Duration::from_millis(250));
        assert!(config.debug);
        assert!(!config.check_status);
    }

    #[test]
    fn missing_device_is_usage_error() {
        let err = link().open().err().expect("no link should fail");
        assert_eq!(err.code, USAGE);
    }
}
