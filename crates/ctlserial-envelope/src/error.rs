/// Reasons a command is rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The opcode does not fit the one-byte opcode field.
    #[error("opcode {opcode} out of range (max {max})")]
    OpcodeOutOfRange { opcode: u32, max: u32 },

    /// More arguments than the device accepts per command.
    #[error("too many arguments ({count}, max {max})")]
    TooManyArguments { count: usize, max: usize },

    /// More string arguments than the device parser accepts per command.
    #[error("too many string arguments ({count}, max {max})")]
    TooManyStrings { count: usize, max: usize },

    /// An integer argument does not fit the device's 32-bit signed range.
    #[error("argument {index}: integer {value} outside the 32-bit signed range")]
    IntegerOutOfRange { index: usize, value: i64 },

    /// A string argument contains characters the link cannot carry.
    #[error("argument {index}: {reason}")]
    InvalidString { index: usize, reason: &'static str },

    /// The encoded body does not fit the device line buffer.
    #[error("command too long ({len} bytes, max {max})")]
    CommandTooLong { len: usize, max: usize },

    /// The value list could not be rendered as a JSON array.
    #[error("values could not be serialized: {0}")]
    Unserializable(String),

    /// A pre-formatted command body is unusable.
    #[error("raw command {0}")]
    InvalidRaw(&'static str),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
