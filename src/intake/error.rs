//! Errors reported to the byte producer.

use thiserror::Error;

/// Errors that can occur when enqueuing a received byte.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntakeError {
    /// The queue was at capacity; the byte was dropped and counted.
    #[error("intake queue full")]
    Full,
    /// The processing loop has dropped its end of the queue.
    #[error("intake queue closed")]
    Closed,
}
