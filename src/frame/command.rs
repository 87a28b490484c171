//! Command types carried in the header's high nibble.

use std::fmt;

use super::FrameError;

/// Protocol command selected by the header's command code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Echo the frame back unchanged.
    Empty,
    /// Add two big-endian `u16` operands.
    Add,
    /// Response to [`CommandType::Add`]; never valid as a request.
    Result,
    /// Schedule a [`CommandType::Timeout`] response after a delay.
    Delay,
    /// Deferred response to [`CommandType::Delay`]; never valid as a request.
    Timeout,
    /// Write the payload text to the diagnostic sink.
    Log,
}

impl CommandType {
    /// Every assigned command, in code order.
    pub const ALL: [Self; 6] = [
        Self::Empty,
        Self::Add,
        Self::Result,
        Self::Delay,
        Self::Timeout,
        Self::Log,
    ];

    /// Wire code for this command.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 1,
            Self::Add => 2,
            Self::Result => 3,
            Self::Delay => 4,
            Self::Timeout => 5,
            Self::Log => 6,
        }
    }

    /// Whether this command may only appear in responses.
    #[must_use]
    pub const fn is_response_only(self) -> bool { matches!(self, Self::Result | Self::Timeout) }

    /// Lowercase name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Add => "add",
            Self::Result => "result",
            Self::Delay => "delay",
            Self::Timeout => "timeout",
            Self::Log => "log",
        }
    }
}

impl TryFrom<u8> for CommandType {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|command| command.code() == code)
            .ok_or(FrameError::UnknownCommand { code })
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
