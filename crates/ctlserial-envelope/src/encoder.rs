use tracing::trace;

use crate::counter::SequenceCounter;
use crate::crc::checksum;
use crate::error::{Result, ValidationError};
use crate::value::Value;
use crate::{FRAME_START, LINE_END, RESPONSE_TAG, TRAILER_SEPARATOR};

/// Largest opcode the one-byte opcode field can carry.
pub const OPCODE_MAX: u32 = 0xFF;

/// Maximum number of arguments per command.
pub const MAX_ARGS: usize = 12;

/// Maximum number of string arguments per command.
pub const MAX_STRING_ARGS: usize = 1;

/// Maximum body length (opcode and argument list) the device line buffer holds.
pub const MAX_BODY_LEN: usize = 58;

/// A sealed line: body, sequence number and checksum, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    body: String,
    sequence: u8,
    checksum: u8,
    frame: String,
}

impl Envelope {
    /// Stamp `body` with `sequence` and its checksum.
    pub fn seal(body: String, sequence: u8) -> Self {
        let checksum = checksum(body.as_bytes(), sequence);
        let frame = format!(
            "{FRAME_START}{body}{TRAILER_SEPARATOR}{sequence:02X}{checksum:02X}{LINE_END}"
        );
        Self {
            body,
            sequence,
            checksum,
            frame,
        }
    }

    /// Text between the frame start and the trailer.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// The complete line including its terminator.
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }
}

/// An encoded command. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    opcode: u8,
    args: Vec<Value>,
    envelope: Envelope,
}

impl Command {
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn sequence(&self) -> u8 {
        self.envelope.sequence
    }

    pub fn checksum(&self) -> u8 {
        self.envelope.checksum
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.envelope.as_bytes()
    }

    pub(crate) fn from_parts(opcode: u8, args: Vec<Value>, envelope: Envelope) -> Self {
        Self {
            opcode,
            args,
            envelope,
        }
    }
}

/// Turns opcodes and arguments into sealed command lines.
///
/// Owns the [`SequenceCounter`]; the counter only advances when a command
/// passes validation, so rejected calls never consume a sequence number.
#[derive(Debug, Default)]
pub struct EnvelopeEncoder {
    counter: SequenceCounter,
}

impl EnvelopeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit counter state.
    pub fn with_counter(counter: SequenceCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    pub fn counter_mut(&mut self) -> &mut SequenceCounter {
        &mut self.counter
    }

    /// Validate and encode one command, consuming a sequence number.
    pub fn encode(&mut self, opcode: u32, args: &[Value]) -> Result<Command> {
        let opcode = validate_opcode(opcode)?;
        validate_args(args)?;
        let body = render_body(opcode, args)?;

        let envelope = Envelope::seal(body, self.counter.issue());
        trace!(
            opcode,
            sequence = envelope.sequence,
            checksum = envelope.checksum,
            "command encoded"
        );
        Ok(Command::from_parts(opcode, args.to_vec(), envelope))
    }

    /// Seal a pre-formatted body such as `2A[13,1]`, consuming a sequence number.
    ///
    /// Only the line-level constraints are checked: non-empty, printable
    /// ASCII, no trailer separator, and within [`MAX_BODY_LEN`].
    pub fn encode_raw(&mut self, body: &str) -> Result<Envelope> {
        if body.is_empty() {
            return Err(ValidationError::InvalidRaw("is empty"));
        }
        if !body.bytes().all(is_printable) {
            return Err(ValidationError::InvalidRaw(
                "contains characters outside printable ASCII",
            ));
        }
        if body.starts_with(FRAME_START) {
            return Err(ValidationError::InvalidRaw("must not include the frame start"));
        }
        if body.contains(TRAILER_SEPARATOR) {
            return Err(ValidationError::InvalidRaw(
                "must not include the trailer separator",
            ));
        }
        if body.len() > MAX_BODY_LEN {
            return Err(ValidationError::CommandTooLong {
                len: body.len(),
                max: MAX_BODY_LEN,
            });
        }

        Ok(Envelope::seal(body.to_string(), self.counter.issue()))
    }

    /// Build the response line a device sends for `sequence`.
    ///
    /// Used by device simulators; the host never sends responses.
    pub fn encode_response(sequence: u8, values: &[Value]) -> Result<Envelope> {
        let body = format!("{RESPONSE_TAG}{}", render_values(values)?);
        Ok(Envelope::seal(body, sequence))
    }
}

fn validate_opcode(opcode: u32) -> Result<u8> {
    if opcode > OPCODE_MAX {
        return Err(ValidationError::OpcodeOutOfRange {
            opcode,
            max: OPCODE_MAX,
        });
    }
    Ok(opcode as u8)
}

fn validate_args(args: &[Value]) -> Result<()> {
    if args.len() > MAX_ARGS {
        return Err(ValidationError::TooManyArguments {
            count: args.len(),
            max: MAX_ARGS,
        });
    }

    let strings = args.iter().filter(|arg| arg.is_text()).count();
    if strings > MAX_STRING_ARGS {
        return Err(ValidationError::TooManyStrings {
            count: strings,
            max: MAX_STRING_ARGS,
        });
    }

    for (index, arg) in args.iter().enumerate() {
        match arg {
            Value::Int(value) => {
                if i32::try_from(*value).is_err() {
                    return Err(ValidationError::IntegerOutOfRange {
                        index,
                        value: *value,
                    });
                }
            }
            Value::Text(text) => {
                if !text.bytes().all(is_printable) {
                    return Err(ValidationError::InvalidString {
                        index,
                        reason: "contains control or non-ASCII characters",
                    });
                }
            }
        }
    }

    Ok(())
}

fn render_body(opcode: u8, args: &[Value]) -> Result<String> {
    let mut body = format!("{opcode:02X}");
    if !args.is_empty() {
        body.push_str(&render_values(args)?);
    }

    if body.len() > MAX_BODY_LEN {
        return Err(ValidationError::CommandTooLong {
            len: body.len(),
            max: MAX_BODY_LEN,
        });
    }
    Ok(body)
}

/// Compact JSON array, as the device parser expects it.
fn render_values(values: &[Value]) -> Result<String> {
    serde_json::to_string(values).map_err(|err| ValidationError::Unserializable(err.to_string()))
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}
