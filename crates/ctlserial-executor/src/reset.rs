use std::thread;
use std::time::Instant;

use ctlserial_envelope::{EnvelopeDecoder, ParsedLine};
use ctlserial_transport::{deadline_after, Transport};
use tracing::{debug, info, warn};

use crate::error::CommunicationError;
use crate::executor::ControlSerial;
use crate::sink::{Direction, LogSink};

impl<T: Transport, L: LogSink> ControlSerial<T, L> {
    /// Hardware-reset the device and wait until it has finished booting.
    ///
    /// Pulses the reset line for [`ResetConfig::pulse`](crate::ResetConfig),
    /// then drains boot output (forwarding log lines to the sink) until the
    /// ready marker is seen or, without a marker, until the link has been
    /// quiet for the configured period. Pending input is discarded and the
    /// sequence counter restarts at zero.
    pub fn reset_device(&mut self) -> Result<(), CommunicationError> {
        let reset = self.config().reset.clone();
        let wire = self.debug();
        info!(pulse = ?reset.pulse, "resetting device");

        let (transport, sink, stats) = self.parts_mut();
        transport.assert_reset()?;
        thread::sleep(reset.pulse);
        transport.release_reset()?;

        let deadline = deadline_after(reset.timeout);
        let mut ready = reset.ready_marker.is_none();
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }

            let line = match transport.read_line(reset.quiet_period.min(deadline - now)) {
                Ok(line) => line,
                Err(err) if err.is_timeout() => {
                    if reset.ready_marker.is_none() {
                        debug!("device quiet after reset");
                        break;
                    }
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if wire {
                sink.wire(Direction::Incoming, &line);
            }

            if let ParsedLine::LogMessage(text) = EnvelopeDecoder::decode(&line) {
                stats.log_messages += 1;
                sink.log_message(&text);
            }
            if let Some(marker) = &reset.ready_marker {
                if line.contains(marker.as_str()) {
                    ready = true;
                    break;
                }
            }
        }

        if !ready {
            warn!(timeout = ?reset.timeout, "ready marker not seen after reset");
            return Err(CommunicationError::ResetTimeout(reset.timeout));
        }

        transport.flush_input()?;
        self.encoder_mut().counter_mut().reset();
        info!("device ready");
        Ok(())
    }
}
