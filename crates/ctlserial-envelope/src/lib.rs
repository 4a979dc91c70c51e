//! Checksummed, sequence-tagged line envelopes.
//!
//! Every command the host sends and every response the device returns is a
//! single ASCII line:
//!
//! ```text
//! command   #OO[args]:SSCC\r\n     OO opcode (hex), args a JSON array (omitted when empty)
//! response  #R[values]:SSCC\r\n    SS sequence of the answered command
//! log       #!free text\r\n        or any line that does not start with '#R'
//! ```
//!
//! `SS` is the wrapping sequence counter and `CC` a CRC-8 over the body
//! (between `#` and `:`) followed by the sequence byte. Both are two
//! uppercase hex digits.
//!
//! The opcode is also two hex digits rather than a raw character, so the
//! full `0..=255` range is representable and never collides with `R`, `!`
//! or the separators. An opcode conventionally named by a letter goes out
//! as its ASCII code: `r` (0x72) is sent as `#72`, not `#r`, and firmware
//! must parse the two-digit form.

pub mod counter;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod value;

pub use counter::SequenceCounter;
pub use crc::{checksum, crc8};
pub use decoder::{EnvelopeDecoder, InvalidLine, ParsedLine, Response};
pub use encoder::{
    Command, Envelope, EnvelopeEncoder, MAX_ARGS, MAX_BODY_LEN, MAX_STRING_ARGS, OPCODE_MAX,
};
pub use error::{Result, ValidationError};
pub use value::Value;

/// First byte of every envelope.
pub const FRAME_START: char = '#';
/// Tag following [`FRAME_START`] on response lines.
pub const RESPONSE_TAG: char = 'R';
/// Tag following [`FRAME_START`] on explicit device log lines.
pub const LOG_TAG: char = '!';
/// Separates the body from the sequence/checksum trailer.
pub const TRAILER_SEPARATOR: char = ':';
/// Line terminator written after every outgoing frame.
pub const LINE_END: &str = "\r\n";
