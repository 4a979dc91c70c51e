use ctlserial_executor::ResetConfig;

use crate::cmd::{parse_duration, ResetArgs};
use crate::exit::{communication_error, CliResult, SUCCESS};

pub fn run(args: ResetArgs) -> CliResult<i32> {
    let mut device = args.link.connect()?;
    device.config_mut().reset = ResetConfig {
        pulse: parse_duration(&args.pulse)?,
        timeout: parse_duration(&args.wait)?,
        ready_marker: args.ready,
        ..ResetConfig::default()
    };

    device
        .reset_device()
        .map_err(|err| communication_error("reset failed", err))?;

    let stats = device.stats();
    println!("device ready ({} boot lines)", stats.log_messages);
    Ok(SUCCESS)
}
