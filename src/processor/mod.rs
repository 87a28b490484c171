//! The processing loop tying intake, assembly, dispatch and timeouts together.
//!
//! Each iteration ([`Processor::poll_once`]) samples the clock, advances the
//! [`FrameAssembler`] with whatever bytes are queued, dispatches at most one
//! completed frame, and then fires every due entry in the [`TimeoutTable`].
//! Nothing in an iteration waits, so a silent or slow sender never delays a
//! pending TIMEOUT.
//!
//! [`Processor::run`] repeats iterations forever. When an iteration makes no
//! progress the task parks on a biased `tokio::select!` over shutdown, the
//! next deadline and intake readability, which wakes it no later than the
//! busy loop would have noticed any of them.

mod builder;
mod stats;

pub use builder::{MAX_QUEUE_CAPACITY, MAX_TICK, ProcessorBuilder, ProcessorConfigError, QueueKind};
pub use stats::ProcessorStats;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    assembler::FrameAssembler,
    clock::Clock,
    diagnostics::Diagnostics,
    dispatch::{CommandDispatcher, Dispatch, timeout_frame},
    error::{ErrorKind, ProcessorError},
    frame::Frame,
    intake::IntakeQueue,
    metrics::{self, Direction},
    outbound::{OutboundHandle, SendOutcome},
    timeouts::TimeoutTable,
};

/// What a single iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Request frame completed and dispatched in this iteration.
    pub dispatched: Option<Frame>,
    /// Response frames queued for the transport, TIMEOUTs included.
    pub responses: usize,
    /// Deferred entries that expired in this iteration.
    pub timeouts_fired: usize,
}

impl PollOutcome {
    /// Whether the iteration consumed a frame or fired a timeout.
    #[must_use]
    pub fn made_progress(&self) -> bool { self.dispatched.is_some() || self.timeouts_fired > 0 }
}

enum Wake {
    Shutdown,
    Deadline,
    Input,
    Closed,
}

/// Owner of the assembler, timeout table and both channel ends.
///
/// # Examples
///
/// ```
/// use nibbleframe::processor::Processor;
///
/// let (mut processor, producer, mut outbound) = Processor::builder()
///     .build()
///     .expect("default configuration is valid");
/// for byte in [0x24, 0x00, 0x02, 0x00, 0x03] {
///     producer.push_from_isr(byte).expect("intake has room");
/// }
/// processor.poll_once();
/// let response = outbound.try_recv().expect("ADD responds immediately");
/// assert_eq!(response.as_bytes(), &[0x32, 0x00, 0x05]);
/// ```
pub struct Processor {
    assembler: FrameAssembler,
    dispatcher: CommandDispatcher,
    timeouts: TimeoutTable,
    intake: IntakeQueue,
    outbound: OutboundHandle,
    clock: Box<dyn Clock>,
    diagnostics: Box<dyn Diagnostics>,
    stats: ProcessorStats,
}

impl Processor {
    /// Start configuring a processor.
    #[must_use]
    pub fn builder() -> ProcessorBuilder { ProcessorBuilder::default() }

    /// Run one non-blocking iteration of the loop.
    pub fn poll_once(&mut self) -> PollOutcome {
        let now = self.clock.now();
        let mut outcome = PollOutcome::default();

        if let Some(frame) = self.assembler.poll(&mut self.intake) {
            outcome.dispatched = Some(frame);
            if self.handle_frame(frame) {
                outcome.responses += 1;
            }
        }

        let expired = self.timeouts.expire_at(now);
        if !expired.is_empty() {
            for entry in expired {
                debug!(slot = entry.slot, payload = entry.payload, "timeout expired");
                outcome.timeouts_fired += 1;
                self.stats.timeouts_fired += 1;
                if self.emit(timeout_frame(entry.payload)) {
                    outcome.responses += 1;
                }
            }
            metrics::set_timeouts_pending(self.timeouts.len());
        }
        outcome
    }

    fn handle_frame(&mut self, frame: Frame) -> bool {
        debug!(?frame, "received");
        self.stats.frames_received += 1;
        metrics::inc_frames(Direction::Inbound);

        let now = self.clock.now();
        match self
            .dispatcher
            .dispatch(&frame, now, &mut self.timeouts, self.diagnostics.as_ref())
        {
            Ok(Dispatch::Respond(response)) => self.emit(response),
            Ok(Dispatch::Scheduled { slot, deadline }) => {
                debug!(slot, deadline_in = ?deadline.saturating_duration_since(now), "delay scheduled");
                metrics::set_timeouts_pending(self.timeouts.len());
                false
            }
            Ok(Dispatch::Logged) => false,
            Err(error) => {
                self.reject(error.into());
                false
            }
        }
    }

    /// Hand a response to the outbound channel, returning whether it was queued.
    fn emit(&mut self, frame: Frame) -> bool {
        match self.outbound.try_send(frame) {
            Ok(SendOutcome::Queued) => {
                self.stats.responses_sent += 1;
                metrics::inc_frames(Direction::Outbound);
                true
            }
            Ok(SendOutcome::Dropped) => {
                metrics::inc_errors(ErrorKind::OutboundDropped);
                false
            }
            Err(error) => {
                self.reject(error.into());
                false
            }
        }
    }

    /// Record a rejected frame or response. The loop always continues.
    fn reject(&mut self, error: ProcessorError) {
        let kind = error.kind();
        match kind {
            ErrorKind::ProtocolViolation => self.stats.protocol_violations += 1,
            ErrorKind::TimeoutTableFull => self.stats.delays_rejected += 1,
            ErrorKind::IntakeOverflow | ErrorKind::OutboundDropped => {}
        }
        metrics::inc_errors(kind);
        warn!(%error, kind = kind.as_str(), "frame rejected");
        self.diagnostics.write(&format!("rejected: {error}"));
    }

    /// Drive the loop until `shutdown` is cancelled.
    ///
    /// The loop also ends once every intake producer has been dropped and no
    /// timeouts remain pending, since nothing further can happen. Returns the
    /// final statistics.
    ///
    /// Deadlines are awaited on the Tokio timer, so the configured clock must
    /// agree with it; the default [`crate::clock::TokioClock`] does.
    pub async fn run(mut self, shutdown: CancellationToken) -> ProcessorStats {
        info!(
            intake_dropped = self.intake.dropped(),
            "processing loop started"
        );
        loop {
            if self.poll_once().made_progress() {
                tokio::task::yield_now().await;
                continue;
            }
            if self.intake.is_closed() && self.timeouts.is_empty() {
                debug!(
                    partial_bytes = self.assembler.bytes_written(),
                    "intake closed with no pending timeouts"
                );
                break;
            }
            match self.park(&shutdown).await {
                Wake::Shutdown => break,
                Wake::Deadline | Wake::Input | Wake::Closed => {}
            }
        }
        let stats = self.stats();
        info!(?stats, "processing loop stopped");
        stats
    }

    async fn park(&mut self, shutdown: &CancellationToken) -> Wake {
        let deadline = self.timeouts.next_deadline();
        let intake_open = !self.intake.is_closed();
        tokio::select! {
            biased;

            () = shutdown.cancelled() => Wake::Shutdown,
            () = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Deadline,
            readable = self.intake.readable(), if intake_open => {
                if readable { Wake::Input } else { Wake::Closed }
            }
        }
    }

    /// Snapshot of the loop's counters, including channel drop counts.
    #[must_use]
    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            intake_dropped: self.intake.dropped(),
            outbound_dropped: self.outbound.dropped(),
            ..self.stats
        }
    }

    /// Pending deferred responses.
    #[must_use]
    pub fn timeouts(&self) -> &TimeoutTable { &self.timeouts }

    /// Assembly cursor for the frame in progress.
    #[must_use]
    pub fn assembler(&self) -> &FrameAssembler { &self.assembler }
}
