//! Reasons a frame is rejected instead of executed.

use thiserror::Error;

use crate::frame::CommandType;

/// Protocol violations and capacity rejections raised by the dispatcher.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The command code is not assigned by the protocol.
    #[error("unknown command code {code}")]
    UnknownCommand {
        /// Code taken from the header.
        code: u8,
    },

    /// The command is only valid in responses.
    #[error("{command} is a response-only command")]
    ResponseOnly {
        /// Offending command.
        command: CommandType,
    },

    /// The payload length does not match the command's layout.
    #[error("{command} expects {expected} payload bytes, got {actual}")]
    MalformedPayload {
        /// Command whose payload was malformed.
        command: CommandType,
        /// Required payload length.
        expected: usize,
        /// Received payload length.
        actual: usize,
    },

    /// Every timeout slot is occupied; the DELAY request was discarded.
    #[error("timeout table full, delay with payload {payload:#04x} discarded")]
    TimeoutTableFull {
        /// Byte the discarded request would have echoed.
        payload: u8,
    },

    /// The requested delay cannot be represented as a deadline.
    #[error("delay of {units} ticks with payload {payload:#04x} is out of range")]
    DelayOutOfRange {
        /// Requested delay in ticks.
        units: u16,
        /// Byte the discarded request would have echoed.
        payload: u8,
    },
}
