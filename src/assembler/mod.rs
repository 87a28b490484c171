//! Incremental frame assembly from a non-blocking byte source.
//!
//! [`FrameAssembler`] is a three-state machine that converts a byte stream
//! into complete [`Frame`]s. Each [`poll`](FrameAssembler::poll) consumes
//! only bytes that are already available and returns promptly, so the caller
//! can service timeouts between partial reads. A frame is never presented
//! until every payload byte the header declares has arrived.

use crate::{
    frame::{Frame, Header, MAX_FRAME_LEN},
    intake::ByteSource,
};

/// Position of the assembler within the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    /// Waiting for the next header byte.
    AwaitingHeader,
    /// Header received; payload bytes outstanding.
    AwaitingPayload,
    /// Buffer holds a complete frame ready for dispatch.
    Ready,
}

/// Reusable assembly buffer and cursor.
///
/// # Examples
///
/// ```
/// use std::collections::VecDeque;
///
/// use nibbleframe::assembler::FrameAssembler;
///
/// let mut assembler = FrameAssembler::new();
/// let mut source: VecDeque<u8> = VecDeque::from([0x24, 0x00, 0x01]);
/// assert!(assembler.poll(&mut source).is_none());
///
/// source.extend([0x00, 0x02]);
/// let frame = assembler.poll(&mut source).expect("frame complete");
/// assert_eq!(frame.as_bytes(), &[0x24, 0x00, 0x01, 0x00, 0x02]);
/// ```
#[derive(Clone, Debug)]
pub struct FrameAssembler {
    buf: [u8; MAX_FRAME_LEN],
    state: AssemblerState,
    bytes_written: usize,
    bytes_remaining: usize,
}

impl Default for FrameAssembler {
    fn default() -> Self { Self::new() }
}

impl FrameAssembler {
    /// Create an assembler waiting for a header.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_FRAME_LEN],
            state: AssemblerState::AwaitingHeader,
            bytes_written: 0,
            bytes_remaining: 0,
        }
    }

    /// Advance with whatever bytes `source` has available.
    ///
    /// Reads at most one header byte and then at most the outstanding payload
    /// bytes. A header whose length is zero completes in the same call.
    /// Returns the finished frame once the last payload byte arrives, after
    /// which the cursor is back at [`AssemblerState::AwaitingHeader`].
    pub fn poll<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Option<Frame> {
        if self.state == AssemblerState::AwaitingHeader {
            self.read_header(source);
        }
        if self.state == AssemblerState::AwaitingPayload {
            self.read_payload(source);
        }
        self.take_ready()
    }

    fn read_header<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if source.try_read(&mut self.buf[..1]) == 0 {
            return;
        }
        self.bytes_written = 1;
        self.bytes_remaining = Header::decode(self.buf[0]).payload_len();
        self.state = AssemblerState::AwaitingPayload;
    }

    fn read_payload<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if self.bytes_remaining > 0 {
            let end = self.bytes_written + self.bytes_remaining;
            let read = source.try_read(&mut self.buf[self.bytes_written..end]);
            self.bytes_written += read;
            self.bytes_remaining -= read;
        }
        if self.bytes_remaining == 0 {
            self.state = AssemblerState::Ready;
        }
    }

    fn take_ready(&mut self) -> Option<Frame> {
        if self.state != AssemblerState::Ready {
            return None;
        }
        let frame = Frame::from_buffer(self.buf);
        self.reset();
        Some(frame)
    }

    /// Discard any partially assembled frame.
    pub fn reset(&mut self) {
        self.state = AssemblerState::AwaitingHeader;
        self.bytes_written = 0;
        self.bytes_remaining = 0;
    }

    /// Current cursor state.
    #[must_use]
    pub const fn state(&self) -> AssemblerState { self.state }

    /// Bytes of the current frame received so far, header included.
    #[must_use]
    pub const fn bytes_written(&self) -> usize { self.bytes_written }

    /// Payload bytes still expected for the current frame.
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize { self.bytes_remaining }
}
