//! Wire frames: a one-byte header followed by up to fifteen payload bytes.
//!
//! ```text
//! byte 0:      bits 7-4 = command code, bits 3-0 = payload length
//! bytes 1..n:  payload, n = payload length
//! ```
//!
//! The header is decoded with explicit shifts and masks rather than a
//! bit-field layout, so the encoding does not depend on the target platform.

mod command;
mod error;
mod header;

use std::fmt;

pub use command::CommandType;
pub use error::FrameError;
pub use header::Header;

/// Largest payload representable by the 4-bit length field.
pub const MAX_PAYLOAD_LEN: usize = 15;

/// Largest encoded frame: header byte plus [`MAX_PAYLOAD_LEN`] payload bytes.
pub const MAX_FRAME_LEN: usize = 1 + MAX_PAYLOAD_LEN;

/// A complete protocol frame.
///
/// The header's length field always equals the number of payload bytes held,
/// so a `Frame` can never describe a partially received message. Frames live
/// in a fixed 16-byte buffer and are `Copy`.
///
/// # Examples
///
/// ```
/// use nibbleframe::frame::{CommandType, Frame};
///
/// let frame = Frame::new(CommandType::Result, &[0x12, 0x34]).expect("payload fits");
/// assert_eq!(frame.as_bytes(), &[0x32, 0x12, 0x34]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    buf: [u8; MAX_FRAME_LEN],
}

impl Frame {
    /// Build a frame for a known command type.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLong`] if `payload` exceeds
    /// [`MAX_PAYLOAD_LEN`] bytes.
    pub fn new(command: CommandType, payload: &[u8]) -> Result<Self, FrameError> {
        Self::with_code(command.code(), payload)
    }

    /// Build a frame carrying a raw command code, valid or not.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLong`] if `payload` exceeds
    /// [`MAX_PAYLOAD_LEN`] bytes, or [`FrameError::CommandOutOfRange`] if
    /// `code` does not fit in four bits.
    pub fn with_code(code: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let header = Header::new(code, payload.len())?;
        let mut buf = [0u8; MAX_FRAME_LEN];
        buf[0] = header.encode();
        buf[1..=payload.len()].copy_from_slice(payload);
        Ok(Self { buf })
    }

    /// Build a frame carrying exactly one payload byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use nibbleframe::frame::{CommandType, Frame};
    ///
    /// assert_eq!(Frame::with_byte(CommandType::Timeout, 0x7F).as_bytes(), &[0x51, 0x7F]);
    /// ```
    #[must_use]
    pub fn with_byte(command: CommandType, byte: u8) -> Self { Self::with_array(command, [byte]) }

    /// Build a frame whose payload length is fixed at compile time.
    ///
    /// Payloads longer than [`MAX_PAYLOAD_LEN`] fail to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use nibbleframe::frame::{CommandType, Frame};
    ///
    /// let frame = Frame::with_array(CommandType::Result, [0x12, 0x34]);
    /// assert_eq!(frame.as_bytes(), &[0x32, 0x12, 0x34]);
    /// ```
    #[must_use]
    pub fn with_array<const N: usize>(command: CommandType, payload: [u8; N]) -> Self {
        const { assert!(N <= MAX_PAYLOAD_LEN, "payload does not fit in a frame") };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "N is at most MAX_PAYLOAD_LEN."
        )]
        let len = N as u8;
        let mut buf = [0u8; MAX_FRAME_LEN];
        buf[0] = Header::fixed(command, len).encode();
        buf[1..=N].copy_from_slice(&payload);
        Self { buf }
    }

    /// Parse a frame from exactly one header byte and its payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Empty`] for an empty slice and
    /// [`FrameError::LengthMismatch`] when the trailing byte count differs from
    /// the header's length field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let (&first, payload) = bytes.split_first().ok_or(FrameError::Empty)?;
        let header = Header::decode(first);
        if payload.len() != header.payload_len() {
            return Err(FrameError::LengthMismatch {
                declared: header.payload_len(),
                actual: payload.len(),
            });
        }
        let mut buf = [0u8; MAX_FRAME_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { buf })
    }

    /// Adopt a fully written assembly buffer, clearing bytes past the payload.
    pub(crate) fn from_buffer(mut buf: [u8; MAX_FRAME_LEN]) -> Self {
        let end = 1 + Header::decode(buf[0]).payload_len();
        buf[end..].fill(0);
        Self { buf }
    }

    /// Decoded header.
    #[must_use]
    pub fn header(&self) -> Header { Header::decode(self.buf[0]) }

    /// Raw four-bit command code from the header.
    #[must_use]
    pub fn command_code(&self) -> u8 { self.header().command_code() }

    /// Command type, or an error for codes outside the protocol.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownCommand`] for unassigned codes.
    pub fn command(&self) -> Result<CommandType, FrameError> {
        CommandType::try_from(self.command_code())
    }

    /// Payload bytes, exactly as many as the header declares.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.buf[1..self.encoded_len()] }

    /// Encoded length on the wire, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize { 1 + self.header().payload_len() }

    /// Encoded bytes on the wire, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.buf[..self.encoded_len()] }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        write!(
            f,
            "Frame {{ type: {:02x}, len: {:02x}, payload: [",
            header.command_code(),
            header.payload_len()
        )?;
        for (i, byte) in self.payload().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        f.write_str("] }")
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> { Self::from_bytes(bytes) }
}
