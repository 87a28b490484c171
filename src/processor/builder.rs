//! Builder for configuring a [`Processor`].

use std::{fmt, num::NonZeroUsize};

use thiserror::Error;
use tokio::time::Duration;

use super::{Processor, ProcessorStats};
use crate::{
    assembler::FrameAssembler,
    clock::{Clock, TokioClock},
    diagnostics::{Diagnostics, TracingDiagnostics},
    dispatch::{CommandDispatcher, DEFAULT_TICK},
    intake::{DEFAULT_INTAKE_CAPACITY, IntakeProducer, intake_channel},
    outbound::{DEFAULT_OUTBOUND_CAPACITY, OutboundQueue, SendPolicy, outbound_channel},
    timeouts::TimeoutTable,
};

/// Highest allowed capacity for either queue.
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Longest allowed DELAY time unit.
pub const MAX_TICK: Duration = Duration::from_secs(3_600);

/// Queue named in a [`ProcessorConfigError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueKind {
    /// Byte queue from the producer to the loop.
    Intake,
    /// Frame queue from the loop to the transport.
    Outbound,
}

/// Errors returned when building a [`Processor`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessorConfigError {
    /// A queue capacity was zero or exceeded [`MAX_QUEUE_CAPACITY`].
    #[error("invalid {queue:?} capacity {capacity}; must be between 1 and {max}", max = MAX_QUEUE_CAPACITY)]
    InvalidCapacity {
        /// Queue that was misconfigured.
        queue: QueueKind,
        /// Rejected capacity.
        capacity: usize,
    },
    /// The DELAY time unit was zero.
    #[error("tick must be greater than zero")]
    ZeroTick,
    /// The DELAY time unit exceeded [`MAX_TICK`].
    #[error("tick {tick:?} exceeds the maximum of {max:?}", max = MAX_TICK)]
    TickTooLong {
        /// Rejected tick.
        tick: Duration,
    },
}

/// Builder for [`Processor`].
///
/// Defaults: a 256-byte intake queue, an 8-frame outbound queue using
/// [`SendPolicy::WarnAndDropIfFull`], a 1 ms DELAY unit, the Tokio clock and
/// tracing-backed diagnostics.
///
/// # Examples
///
/// ```
/// use nibbleframe::{outbound::SendPolicy, processor::Processor};
/// use tokio::time::Duration;
///
/// let (_processor, _producer, _outbound) = Processor::builder()
///     .intake_capacity(64)
///     .outbound_capacity(4)
///     .send_policy(SendPolicy::DropIfFull)
///     .tick(Duration::from_millis(10))
///     .build()
///     .expect("configuration is valid");
/// ```
pub struct ProcessorBuilder {
    intake_capacity: usize,
    outbound_capacity: usize,
    send_policy: SendPolicy,
    tick: Duration,
    clock: Box<dyn Clock>,
    diagnostics: Box<dyn Diagnostics>,
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            send_policy: SendPolicy::default(),
            tick: DEFAULT_TICK,
            clock: Box::new(TokioClock),
            diagnostics: Box::new(TracingDiagnostics),
        }
    }
}

impl fmt::Debug for ProcessorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorBuilder")
            .field("intake_capacity", &self.intake_capacity)
            .field("outbound_capacity", &self.outbound_capacity)
            .field("send_policy", &self.send_policy)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl ProcessorBuilder {
    /// Set the intake queue capacity in bytes.
    #[must_use]
    pub fn intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    /// Set the outbound queue capacity in frames.
    #[must_use]
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Choose what happens when the outbound queue is full.
    #[must_use]
    pub fn send_policy(mut self, policy: SendPolicy) -> Self {
        self.send_policy = policy;
        self
    }

    /// Set the length of one DELAY time unit.
    #[must_use]
    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Replace the monotonic clock.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Build the processor and the two channel ends it does not own.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorConfigError::InvalidCapacity`] if either capacity is
    /// zero or above [`MAX_QUEUE_CAPACITY`], and
    /// [`ProcessorConfigError::ZeroTick`] for a zero tick, and
    /// [`ProcessorConfigError::TickTooLong`] for one above [`MAX_TICK`].
    pub fn build(self) -> Result<(Processor, IntakeProducer, OutboundQueue), ProcessorConfigError> {
        let intake_capacity = validate_capacity(QueueKind::Intake, self.intake_capacity)?;
        let outbound_capacity = validate_capacity(QueueKind::Outbound, self.outbound_capacity)?;
        if self.tick.is_zero() {
            return Err(ProcessorConfigError::ZeroTick);
        }
        if self.tick > MAX_TICK {
            return Err(ProcessorConfigError::TickTooLong { tick: self.tick });
        }

        let (producer, intake) = intake_channel(intake_capacity);
        let (outbound, queue) = outbound_channel(outbound_capacity, self.send_policy);
        let processor = Processor {
            assembler: FrameAssembler::new(),
            dispatcher: CommandDispatcher::new(self.tick),
            timeouts: TimeoutTable::new(),
            intake,
            outbound,
            clock: self.clock,
            diagnostics: self.diagnostics,
            stats: ProcessorStats::default(),
        };
        Ok((processor, producer, queue))
    }
}

fn validate_capacity(queue: QueueKind, capacity: usize) -> Result<NonZeroUsize, ProcessorConfigError> {
    NonZeroUsize::new(capacity)
        .filter(|c| c.get() <= MAX_QUEUE_CAPACITY)
        .ok_or(ProcessorConfigError::InvalidCapacity { queue, capacity })
}
