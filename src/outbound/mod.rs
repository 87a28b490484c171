//! Bounded channel carrying response frames to the external transport.
//!
//! The processing loop owns an [`OutboundHandle`] and never waits on it:
//! [`OutboundHandle::try_send`] either enqueues the frame or applies the
//! configured [`SendPolicy`]. Every frame that does not make it into the
//! queue is counted. The transport side reads from [`OutboundQueue`].

mod errors;

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

pub use errors::OutboundError;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

use crate::frame::Frame;

/// Default outbound capacity in frames.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 8;

/// Behaviour when the outbound queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SendPolicy {
    /// Return [`OutboundError::Full`] to the caller.
    ReturnErrorIfFull,
    /// Silently drop the frame.
    DropIfFull,
    /// Drop the frame but emit a log warning.
    #[default]
    WarnAndDropIfFull,
}

/// Create a bounded outbound channel holding up to `capacity` frames.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use nibbleframe::{
///     frame::{CommandType, Frame},
///     outbound::{SendOutcome, SendPolicy, outbound_channel},
/// };
///
/// let (handle, mut queue) =
///     outbound_channel(NonZeroUsize::new(2).expect("non-zero"), SendPolicy::DropIfFull);
/// let frame = Frame::new(CommandType::Empty, &[]).expect("payload fits");
/// let outcome = handle.try_send(frame).expect("queue has room");
/// assert_eq!(outcome, SendOutcome::Queued);
/// assert_eq!(queue.try_recv(), Some(frame));
/// ```
#[must_use]
pub fn outbound_channel(capacity: NonZeroUsize, policy: SendPolicy) -> (OutboundHandle, OutboundQueue) {
    let (tx, rx) = mpsc::channel(capacity.get());
    (
        OutboundHandle {
            tx,
            policy,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        OutboundQueue { rx },
    )
}

/// What happened to a frame accepted by [`OutboundHandle::try_send`].
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame is in the queue.
    Queued,
    /// The queue was full and the policy discarded the frame.
    Dropped,
}

/// Sending half used by the response emitter.
#[derive(Clone, Debug)]
pub struct OutboundHandle {
    tx: mpsc::Sender<Frame>,
    policy: SendPolicy,
    dropped: Arc<AtomicU64>,
}

impl OutboundHandle {
    /// Hand a frame to the transport without waiting.
    ///
    /// Returns [`SendOutcome::Dropped`] when a drop policy discarded the frame.
    ///
    /// # Errors
    ///
    /// Returns [`OutboundError::Full`] if the queue is full and the policy is
    /// [`SendPolicy::ReturnErrorIfFull`]; [`OutboundError::Closed`] if the
    /// transport has dropped its queue. Both cases count the frame as dropped.
    pub fn try_send(&self, frame: Frame) -> Result<SendOutcome, OutboundError> {
        match self.tx.try_send(frame) {
            Ok(()) => {
                debug!(?frame, "sent");
                Ok(SendOutcome::Queued)
            }
            Err(TrySendError::Full(frame)) => {
                let dropped = self.record_drop();
                match self.policy {
                    SendPolicy::ReturnErrorIfFull => Err(OutboundError::Full),
                    SendPolicy::DropIfFull => Ok(SendOutcome::Dropped),
                    SendPolicy::WarnAndDropIfFull => {
                        warn!(?frame, dropped, "outbound queue full, frame dropped");
                        Ok(SendOutcome::Dropped)
                    }
                }
            }
            Err(TrySendError::Closed(_)) => {
                self.record_drop();
                Err(OutboundError::Closed)
            }
        }
    }

    fn record_drop(&self) -> u64 { self.dropped.fetch_add(1, Ordering::Relaxed) + 1 }

    /// Total frames that never reached the queue.
    #[must_use]
    pub fn dropped(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }

    /// Configured full-queue policy.
    #[must_use]
    pub fn policy(&self) -> SendPolicy { self.policy }
}

/// Receiving half owned by the external transport.
#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::Receiver<Frame>,
}

impl OutboundQueue {
    /// Wait for the next response frame.
    ///
    /// Returns `None` once the processing loop has stopped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<Frame> { self.rx.recv().await }

    /// Take the next response frame if one is queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take every frame queued right now.
    pub fn drain(&mut self) -> Vec<Frame> { std::iter::from_fn(|| self.try_recv()).collect() }
}
