//! Byte intake from the interrupt-context producer.
//!
//! The producer side mimics a receive ISR: [`IntakeProducer::push_from_isr`]
//! never waits and reports, rather than hides, bytes lost to a full queue. The
//! consumer side ([`IntakeQueue`]) is read by the frame assembler through the
//! non-blocking [`ByteSource`] trait.

mod error;

use std::{
    collections::VecDeque,
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

pub use error::IntakeError;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::warn;

use crate::{error::ErrorKind, metrics};

/// Default intake capacity in bytes.
pub const DEFAULT_INTAKE_CAPACITY: usize = 256;

/// Emit a warning for the first overflow and then once per this many drops.
const OVERFLOW_LOG_EVERY_N: u64 = 64;

/// Non-blocking source of raw bytes.
pub trait ByteSource {
    /// Copy up to `buf.len()` immediately available bytes into `buf`.
    ///
    /// Returns the number of bytes written, which may be zero. Implementations
    /// must never wait for data.
    fn try_read(&mut self, buf: &mut [u8]) -> usize;
}

impl ByteSource for VecDeque<u8> {
    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        for (slot, byte) in buf.iter_mut().zip(self.drain(..n)) {
            *slot = byte;
        }
        n
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn try_read(&mut self, buf: &mut [u8]) -> usize { (**self).try_read(buf) }
}

/// Create a bounded intake channel holding up to `capacity` bytes.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use nibbleframe::intake::{ByteSource, intake_channel};
///
/// let (producer, mut queue) = intake_channel(NonZeroUsize::new(4).expect("non-zero"));
/// producer.push_from_isr(0x10).expect("queue has room");
///
/// let mut buf = [0u8; 4];
/// assert_eq!(queue.try_read(&mut buf), 1);
/// assert_eq!(buf[0], 0x10);
/// ```
#[must_use]
pub fn intake_channel(capacity: NonZeroUsize) -> (IntakeProducer, IntakeQueue) {
    let (tx, rx) = mpsc::channel(capacity.get());
    let dropped = Arc::new(AtomicU64::new(0));
    (
        IntakeProducer {
            tx,
            dropped: Arc::clone(&dropped),
        },
        IntakeQueue {
            rx,
            stashed: None,
            closed: false,
            dropped,
        },
    )
}

/// Producer half handed to the receive interrupt.
#[derive(Clone, Debug)]
pub struct IntakeProducer {
    tx: mpsc::Sender<u8>,
    dropped: Arc<AtomicU64>,
}

impl IntakeProducer {
    /// Enqueue one received byte without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Full`] when the queue has no room; the byte is
    /// discarded and counted. Returns [`IntakeError::Closed`] once the
    /// processing loop has dropped its queue.
    pub fn push_from_isr(&self, byte: u8) -> Result<(), IntakeError> {
        match self.tx.try_send(byte) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(byte)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::inc_errors(ErrorKind::IntakeOverflow);
                if dropped == 1 || dropped.is_multiple_of(OVERFLOW_LOG_EVERY_N) {
                    warn!(byte, dropped, "intake queue full, byte dropped");
                }
                Err(IntakeError::Full)
            }
            Err(TrySendError::Closed(_)) => Err(IntakeError::Closed),
        }
    }

    /// Total bytes dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }
}

/// Consumer half owned by the processing loop.
#[derive(Debug)]
pub struct IntakeQueue {
    rx: mpsc::Receiver<u8>,
    // Byte taken by `readable` while parking; served before the channel.
    stashed: Option<u8>,
    closed: bool,
    dropped: Arc<AtomicU64>,
}

impl IntakeQueue {
    /// Wait until at least one byte can be read without blocking.
    ///
    /// Returns `false` once every producer has been dropped and no bytes
    /// remain. Cancel safe: a byte received here is kept for the next
    /// [`ByteSource::try_read`].
    pub async fn readable(&mut self) -> bool {
        if self.stashed.is_some() {
            return true;
        }
        if self.closed {
            return false;
        }
        if let Some(byte) = self.rx.recv().await {
            self.stashed = Some(byte);
            true
        } else {
            self.closed = true;
            false
        }
    }

    /// Whether all producers are gone and every byte has been consumed.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed && self.stashed.is_none() }

    /// Total bytes the producers dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }
}

impl ByteSource for IntakeQueue {
    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        for slot in buf.iter_mut() {
            let next = match self.stashed.take() {
                Some(byte) => byte,
                None => match self.rx.try_recv() {
                    Ok(byte) => byte,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.closed = true;
                        break;
                    }
                },
            };
            *slot = next;
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests;
