//! Errors raised while building or parsing frames.

use thiserror::Error;

/// Framing errors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The payload does not fit in the four-bit length field.
    #[error("payload of {len} bytes exceeds maximum of {max}")]
    PayloadTooLong {
        /// Requested payload length.
        len: usize,
        /// Largest representable payload.
        max: usize,
    },

    /// The command code does not fit in four bits.
    #[error("command code {code} does not fit in a nibble")]
    CommandOutOfRange {
        /// Rejected code.
        code: u8,
    },

    /// The command code is not assigned by the protocol.
    #[error("unknown command code {code}")]
    UnknownCommand {
        /// Unassigned code taken from the header.
        code: u8,
    },

    /// The byte count after the header differs from the declared length.
    #[error("header declares {declared} payload bytes but {actual} follow")]
    LengthMismatch {
        /// Length from the header.
        declared: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// No header byte was supplied.
    #[error("empty frame buffer")]
    Empty,
}
