use crate::crc::checksum;
use crate::encoder::{Command, Envelope};
use crate::value::Value;
use crate::{FRAME_START, LOG_TAG, RESPONSE_TAG, TRAILER_SEPARATOR};

/// A checksum-verified response from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Sequence number of the command this answers.
    pub sequence: u8,
    /// Result values, possibly none.
    pub values: Vec<Value>,
}

/// Why a line could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidLine {
    /// Nothing but a line terminator.
    #[error("empty line")]
    Empty,

    /// The line claims to be an envelope but its structure is broken.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The envelope is well formed but was corrupted in transit.
    #[error("checksum mismatch (expected {expected:02X}, received {received:02X})")]
    ChecksumMismatch { expected: u8, received: u8 },
}

/// Classification of one incoming line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Response(Response),
    LogMessage(String),
    Invalid(InvalidLine),
}

/// Classifies incoming lines. Stateless; performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

impl EnvelopeDecoder {
    /// Classify a line received from the device.
    ///
    /// Only lines starting with `#R` are candidate responses; they either
    /// verify or come back [`ParsedLine::Invalid`]. Everything else that is
    /// not empty is device output and becomes a [`ParsedLine::LogMessage`]
    /// (with the `#!` prefix stripped when present).
    pub fn decode(line: &str) -> ParsedLine {
        let line = strip_terminator(line);
        if line.is_empty() {
            return ParsedLine::Invalid(InvalidLine::Empty);
        }

        let Some(text) = line.strip_prefix(FRAME_START) else {
            return ParsedLine::LogMessage(line.to_string());
        };

        if let Some(message) = text.strip_prefix(LOG_TAG) {
            return ParsedLine::LogMessage(message.to_string());
        }

        if !text.starts_with(RESPONSE_TAG) {
            return ParsedLine::LogMessage(line.to_string());
        }

        match parse_response(text) {
            Ok(response) => ParsedLine::Response(response),
            Err(invalid) => ParsedLine::Invalid(invalid),
        }
    }

    /// Parse a command line the way the device does.
    ///
    /// The host never receives commands; this is the inverse of
    /// [`EnvelopeEncoder::encode`](crate::EnvelopeEncoder::encode) for
    /// device simulators and tests.
    pub fn decode_command(line: &str) -> Result<Command, InvalidLine> {
        let line = strip_terminator(line);
        if line.is_empty() {
            return Err(InvalidLine::Empty);
        }
        let text = line
            .strip_prefix(FRAME_START)
            .ok_or_else(|| malformed("missing frame start"))?;
        let (body, sequence) = unseal(text)?;

        let opcode = body
            .get(..2)
            .filter(|digits| is_hex(digits))
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(|| malformed("opcode is not two hex digits"))?;

        let rest = &body[2..];
        let args = if rest.is_empty() {
            Vec::new()
        } else {
            parse_values(rest)?
        };

        let envelope = Envelope::seal(body.to_string(), sequence);
        Ok(Command::from_parts(opcode, args, envelope))
    }
}

fn parse_response(text: &str) -> Result<Response, InvalidLine> {
    let (body, sequence) = unseal(text)?;
    let values = parse_values(&body[RESPONSE_TAG.len_utf8()..])?;
    Ok(Response { sequence, values })
}

/// Split `body:SSCC` and verify the checksum.
fn unseal(text: &str) -> Result<(&str, u8), InvalidLine> {
    let (body, trailer) = text
        .rsplit_once(TRAILER_SEPARATOR)
        .ok_or_else(|| malformed("missing trailer"))?;

    if trailer.len() != 4 || !is_hex(trailer) {
        return Err(malformed("trailer is not four hex digits"));
    }
    let sequence = u8::from_str_radix(&trailer[..2], 16).map_err(malformed)?;
    let received = u8::from_str_radix(&trailer[2..], 16).map_err(malformed)?;

    let expected = checksum(body.as_bytes(), sequence);
    if expected != received {
        return Err(InvalidLine::ChecksumMismatch { expected, received });
    }
    Ok((body, sequence))
}

fn parse_values(text: &str) -> Result<Vec<Value>, InvalidLine> {
    if !text.starts_with('[') {
        return Err(malformed("expected a value array"));
    }
    serde_json::from_str(text).map_err(malformed)
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn is_hex(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn malformed(reason: impl ToString) -> InvalidLine {
    InvalidLine::Malformed(reason.to_string())
}
