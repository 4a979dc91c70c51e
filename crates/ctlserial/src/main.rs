mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ctlserial", version, about = "Talk to a ControlSerial device")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.command.wire_debug());

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exec_subcommand() {
        let cli = Cli::try_parse_from([
            "ctlserial",
            "exec",
            "--tcp",
            "127.0.0.1:4000",
            "0x72",
            "-5",
            "on",
        ])
        .expect("exec args should parse");

        match cli.command {
            Command::Exec(args) => {
                assert_eq!(args.opcode, "0x72");
                assert_eq!(args.args, vec!["-5", "on"]);
                assert_eq!(args.link.tcp.as_deref(), Some("127.0.0.1:4000"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_port_and_tcp_together() {
        let err = Cli::try_parse_from([
            "ctlserial",
            "monitor",
            "--port",
            "/dev/ttyACM0",
            "--tcp",
            "127.0.0.1:4000",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn debug_flag_raises_log_level() {
        let cli = Cli::try_parse_from(["ctlserial", "exec", "--port", "/dev/null", "--debug", "1"])
            .expect("exec args should parse");
        assert!(cli.command.wire_debug());
    }

    #[test]
    fn parses_reset_subcommand() {
        let cli = Cli::try_parse_from([
            "ctlserial",
            "reset",
            "--port",
            "/dev/ttyUSB0",
            "--ready",
            "READY",
            "--wait",
            "5s",
        ])
        .expect("reset args should parse");
        assert!(matches!(cli.command, Command::Reset(_)));
    }
}
