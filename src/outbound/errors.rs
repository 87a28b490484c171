//! Errors raised when emitting response frames.

use thiserror::Error;

/// Errors that can occur when handing a frame to the outbound channel.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OutboundError {
    /// The queue was at capacity and the policy was `ReturnErrorIfFull`.
    #[error("outbound queue full")]
    Full,
    /// The transport has dropped its end of the queue.
    #[error("outbound queue closed")]
    Closed,
}
