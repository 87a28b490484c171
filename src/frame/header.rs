//! Bit-packed frame header codec.

use super::{CommandType, FrameError, MAX_PAYLOAD_LEN};

const NIBBLE_MASK: u8 = 0x0F;
const COMMAND_SHIFT: u32 = 4;

/// Decoded header byte: a four-bit command code and a four-bit payload length.
///
/// The command code is held raw so that unassigned codes reach the dispatcher
/// and can be reported rather than silently lost during parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    command_code: u8,
    payload_len: u8,
}

impl Header {
    /// Build a header from its fields.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::CommandOutOfRange`] if `command_code` exceeds four
    /// bits or [`FrameError::PayloadTooLong`] if `payload_len` exceeds
    /// [`MAX_PAYLOAD_LEN`].
    pub fn new(command_code: u8, payload_len: usize) -> Result<Self, FrameError> {
        if command_code > NIBBLE_MASK {
            return Err(FrameError::CommandOutOfRange { code: command_code });
        }
        let len = u8::try_from(payload_len)
            .ok()
            .filter(|len| usize::from(*len) <= MAX_PAYLOAD_LEN)
            .ok_or(FrameError::PayloadTooLong {
                len: payload_len,
                max: MAX_PAYLOAD_LEN,
            })?;
        Ok(Self {
            command_code,
            payload_len: len,
        })
    }

    /// Header for a frame of `command` whose payload length already fits.
    pub(crate) const fn fixed(command: CommandType, payload_len: u8) -> Self {
        Self {
            command_code: command.code(),
            payload_len: payload_len & NIBBLE_MASK,
        }
    }

    /// Split a header byte into its command and length nibbles.
    ///
    /// Every byte is a valid header; validation of the command code happens
    /// when the frame is dispatched.
    ///
    /// # Examples
    ///
    /// ```
    /// use nibbleframe::frame::Header;
    ///
    /// let header = Header::decode(0x43);
    /// assert_eq!(header.command_code(), 4);
    /// assert_eq!(header.payload_len(), 3);
    /// ```
    #[must_use]
    pub const fn decode(byte: u8) -> Self {
        Self {
            command_code: byte >> COMMAND_SHIFT,
            payload_len: byte & NIBBLE_MASK,
        }
    }

    /// Pack the header back into its wire byte.
    #[must_use]
    pub const fn encode(self) -> u8 { (self.command_code << COMMAND_SHIFT) | self.payload_len }

    /// Four-bit command code.
    #[must_use]
    pub const fn command_code(self) -> u8 { self.command_code }

    /// Number of payload bytes following the header.
    #[must_use]
    pub fn payload_len(self) -> usize { usize::from(self.payload_len) }
}
