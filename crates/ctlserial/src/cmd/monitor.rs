use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ctlserial_envelope::EnvelopeDecoder;
use ctlserial_executor::Transport;
use ctlserial_transport::TransportError;
use tracing::{debug, info};

use crate::cmd::MonitorArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_line, OutputFormat};

const POLL: Duration = Duration::from_millis(200);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let mut link = args.link.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        let line = match link.read_line(POLL) {
            Ok(line) => line,
            Err(err) if err.is_timeout() => continue,
            Err(TransportError::Closed) => {
                info!("device closed the link");
                break;
            }
            Err(err) => return Err(transport_error("read failed", err)),
        };
        if args.link.debug {
            debug!(target: "ctlserial::wire", direction = "incoming", line = %line);
        }

        print_line(&EnvelopeDecoder::decode(&line), format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
