//! Crate-level error taxonomy.
//!
//! None of these errors stop the processing loop. Each is logged, counted
//! and classified by [`ErrorKind`] for metric labels, after which the loop
//! returns to waiting for the next header byte.

use thiserror::Error;

use crate::{dispatch::DispatchError, intake::IntakeError, outbound::OutboundError};

/// Coarse classification of loop errors, used as the `kind` metric label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown or response-only command, or a malformed payload.
    ProtocolViolation,
    /// A received byte was dropped because the intake queue was full.
    IntakeOverflow,
    /// A DELAY request was dropped because every timeout slot was taken.
    TimeoutTableFull,
    /// A response frame could not be handed to the outbound channel.
    OutboundDropped,
}

impl ErrorKind {
    /// Label value for metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProtocolViolation => "protocol_violation",
            Self::IntakeOverflow => "intake_overflow",
            Self::TimeoutTableFull => "timeout_table_full",
            Self::OutboundDropped => "outbound_dropped",
        }
    }
}

/// Any error observed by the processing loop.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorError {
    /// A frame was rejected by the dispatcher.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    /// The byte producer could not enqueue.
    #[error("intake error: {0}")]
    Intake(#[from] IntakeError),
    /// A response could not be emitted.
    #[error("outbound error: {0}")]
    Outbound(#[from] OutboundError),
}

impl ProcessorError {
    /// Classify the error for metrics and statistics.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Dispatch(DispatchError::TimeoutTableFull { .. }) => ErrorKind::TimeoutTableFull,
            Self::Dispatch(_) => ErrorKind::ProtocolViolation,
            Self::Intake(_) => ErrorKind::IntakeOverflow,
            Self::Outbound(_) => ErrorKind::OutboundDropped,
        }
    }
}
