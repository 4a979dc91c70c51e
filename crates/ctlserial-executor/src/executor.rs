use std::time::Instant;

use ctlserial_envelope::{
    Envelope, EnvelopeDecoder, EnvelopeEncoder, InvalidLine, ParsedLine, ValidationError, Value,
};
use ctlserial_transport::{deadline_after, Transport};
use tracing::{debug, trace, warn};

use crate::config::ExecutorConfig;
use crate::error::{CommunicationError, ExecuteError, FailureCause, Result};
use crate::sink::{Direction, LogSink, TracingLogSink};

/// Running totals across every command issued by one executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Calls to `execute`/`send_raw` that got past validation.
    pub commands: u64,
    /// Frames written, including retries.
    pub attempts: u64,
    /// Attempts beyond the first.
    pub retries: u64,
    /// Device log lines forwarded to the sink.
    pub log_messages: u64,
    /// Responses discarded because they answered an earlier command.
    pub stale_responses: u64,
    /// Lines that were neither a response nor a log message.
    pub invalid_lines: u64,
}

/// The single outstanding command.
#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    sequence: u8,
    attempt: u32,
    deadline: Instant,
}

/// Where one `execute` call stands.
#[derive(Debug)]
enum State {
    Idle,
    Sent { envelope: Envelope, attempt: u32 },
    AwaitingMatch(PendingRequest),
    Retrying { attempt: u32, cause: FailureCause },
    Resolved(Vec<Value>),
    Failed(ExecuteError),
}

/// How an attempt's read loop ended.
enum Outcome {
    Matched(Vec<Value>),
    Retry(FailureCause),
}

/// Issues commands to a device and waits for their responses.
///
/// Owns its transport exclusively; commands are strictly sequential and at
/// most one is outstanding. Share an executor between threads behind a
/// mutex, never two executors over one link.
pub struct ControlSerial<T, L = TracingLogSink> {
    transport: T,
    encoder: EnvelopeEncoder,
    sink: L,
    config: ExecutorConfig,
    stats: ExecutorStats,
}

impl<T: Transport> ControlSerial<T> {
    /// Create an executor with default configuration, logging through `tracing`.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExecutorConfig::default())
    }

    /// Create an executor with explicit configuration, logging through `tracing`.
    pub fn with_config(transport: T, config: ExecutorConfig) -> Self {
        Self::with_sink(transport, config, TracingLogSink)
    }
}

impl<T: Transport, L: LogSink> ControlSerial<T, L> {
    /// Create an executor that hands device log output to `sink`.
    pub fn with_sink(transport: T, config: ExecutorConfig, sink: L) -> Self {
        Self {
            transport,
            encoder: EnvelopeEncoder::new(),
            sink,
            config,
            stats: ExecutorStats::default(),
        }
    }

    /// Run `opcode` with `args` on the device and return its result values.
    ///
    /// Validation failures are returned before anything is written. Timeouts,
    /// corrupted and malformed replies (and negative device status, when
    /// status checking is on) are retried up to
    /// [`ExecutorConfig::retry_limit`] times, each retry under a fresh
    /// sequence number.
    pub fn execute(&mut self, opcode: u32, args: &[Value]) -> Result<Vec<Value>> {
        self.run(|encoder| {
            encoder
                .encode(opcode, args)
                .map(|command| command.into_envelope())
        })
    }

    /// Like [`execute`](Self::execute) for a pre-formatted body such as `2A[13,1]`.
    pub fn send_raw(&mut self, body: &str) -> Result<Vec<Value>> {
        self.run(|encoder| encoder.encode_raw(body))
    }

    fn run<F>(&mut self, mut encode: F) -> Result<Vec<Value>>
    where
        F: FnMut(&mut EnvelopeEncoder) -> std::result::Result<Envelope, ValidationError>,
    {
        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => {
                    let envelope = encode(&mut self.encoder)?;
                    self.stats.commands += 1;
                    State::Sent {
                        envelope,
                        attempt: 0,
                    }
                }
                State::Sent { envelope, attempt } => match self.send(&envelope) {
                    Ok(()) => State::AwaitingMatch(PendingRequest {
                        sequence: envelope.sequence(),
                        attempt,
                        deadline: deadline_after(self.config.attempt_timeout),
                    }),
                    Err(err) => State::Failed(err.into()),
                },
                State::AwaitingMatch(pending) => match self.await_match(&pending) {
                    Ok(Outcome::Matched(values)) => self.resolve(values, pending.attempt),
                    Ok(Outcome::Retry(cause)) => State::Retrying {
                        attempt: pending.attempt,
                        cause,
                    },
                    Err(err) => State::Failed(err.into()),
                },
                State::Retrying { attempt, cause } => {
                    if attempt < self.config.retry_limit {
                        debug!(attempt = attempt + 1, %cause, "retrying command");
                        self.stats.retries += 1;
                        State::Sent {
                            envelope: encode(&mut self.encoder)?,
                            attempt: attempt + 1,
                        }
                    } else {
                        warn!(attempts = attempt + 1, %cause, "command failed");
                        State::Failed(
                            CommunicationError::RetriesExhausted {
                                attempts: attempt + 1,
                                cause,
                            }
                            .into(),
                        )
                    }
                }
                State::Resolved(values) => return Ok(values),
                State::Failed(err) => return Err(err),
            };
        }
    }

    fn send(&mut self, envelope: &Envelope) -> std::result::Result<(), CommunicationError> {
        if self.config.debug {
            self.sink
                .wire(Direction::Outgoing, envelope.frame().trim_end());
        }
        trace!(sequence = envelope.sequence(), "writing command");
        self.transport.write(envelope.as_bytes())?;
        self.stats.attempts += 1;
        Ok(())
    }

    fn await_match(
        &mut self,
        pending: &PendingRequest,
    ) -> std::result::Result<Outcome, CommunicationError> {
        loop {
            let now = Instant::now();
            if now >= pending.deadline {
                return Ok(Outcome::Retry(FailureCause::Timeout));
            }

            let line = match self.transport.read_line(pending.deadline - now) {
                Ok(line) => line,
                Err(err) if err.is_timeout() => return Ok(Outcome::Retry(FailureCause::Timeout)),
                Err(err) => return Err(err.into()),
            };
            if self.config.debug {
                self.sink.wire(Direction::Incoming, &line);
            }

            match EnvelopeDecoder::decode(&line) {
                ParsedLine::Response(response) if response.sequence == pending.sequence => {
                    return Ok(Outcome::Matched(response.values));
                }
                ParsedLine::Response(response) => {
                    self.stats.stale_responses += 1;
                    debug!(
                        expected = pending.sequence,
                        received = response.sequence,
                        "discarding stale response"
                    );
                }
                ParsedLine::LogMessage(text) => {
                    self.stats.log_messages += 1;
                    self.sink.log_message(&text);
                }
                ParsedLine::Invalid(InvalidLine::Empty) => {
                    self.stats.invalid_lines += 1;
                }
                ParsedLine::Invalid(InvalidLine::ChecksumMismatch { expected, received }) => {
                    self.stats.invalid_lines += 1;
                    debug!(expected, received, "response checksum mismatch");
                    return Ok(Outcome::Retry(FailureCause::ChecksumMismatch));
                }
                ParsedLine::Invalid(InvalidLine::Malformed(reason)) => {
                    self.stats.invalid_lines += 1;
                    debug!(%reason, "malformed response");
                    return Ok(Outcome::Retry(FailureCause::Malformed(reason)));
                }
            }
        }
    }

    /// Apply the device status convention to a matched response.
    fn resolve(&self, values: Vec<Value>, attempt: u32) -> State {
        if !self.config.check_status {
            return State::Resolved(values);
        }

        match values.first().and_then(Value::as_int) {
            Some(code) if code < 0 => State::Retrying {
                attempt,
                cause: FailureCause::DeviceBusy(code),
            },
            Some(code) if code > 0 => State::Failed(ExecuteError::Device {
                code,
                message: values.get(1).and_then(Value::as_str).map(str::to_string),
            }),
            _ => State::Resolved(values),
        }
    }

    /// Whether raw traffic is routed to the sink.
    pub fn debug(&self) -> bool {
        self.config.debug
    }

    /// Toggle debug mode. Protocol behaviour is unaffected.
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ExecutorConfig {
        &mut self.config
    }

    pub fn stats(&self) -> ExecutorStats {
        self.stats
    }

    /// Sequence number the next command will carry.
    pub fn next_sequence(&self) -> u8 {
        self.encoder.counter().current()
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut L {
        &mut self.sink
    }

    /// Consume the executor and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    pub(crate) fn encoder_mut(&mut self) -> &mut EnvelopeEncoder {
        &mut self.encoder
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut T, &mut L, &mut ExecutorStats) {
        (&mut self.transport, &mut self.sink, &mut self.stats)
    }
}

impl<T, L> std::fmt::Debug for ControlSerial<T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSerial")
            .field("next_sequence", &self.encoder.counter().current())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}
