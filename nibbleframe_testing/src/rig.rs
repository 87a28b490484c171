//! Synchronous harness around a processor and its channel ends.

use nibbleframe::{
    IntakeProducer,
    OutboundQueue,
    PollOutcome,
    Processor,
    ProcessorStats,
    TimeoutTable,
};

use crate::{ManualClock, RecordingDiagnostics};

/// Processor wired to a [`ManualClock`] and [`RecordingDiagnostics`].
pub struct TestRig {
    processor: Processor,
    producer: IntakeProducer,
    outbound: OutboundQueue,
    /// Clock shared with the processor.
    pub clock: ManualClock,
    /// Diagnostics shared with the processor.
    pub diagnostics: RecordingDiagnostics,
}

impl TestRig {
    /// Build a rig with default queue sizes and a 64-frame outbound queue.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration is rejected.
    #[must_use]
    pub fn new(clock: ManualClock, diagnostics: RecordingDiagnostics) -> Self {
        let (processor, producer, outbound) = Processor::builder()
            .outbound_capacity(64)
            .clock(clock.clone())
            .diagnostics(diagnostics.clone())
            .build()
            .expect("default rig configuration is valid");
        Self {
            processor,
            producer,
            outbound,
            clock,
            diagnostics,
        }
    }

    /// Push bytes as the receive interrupt would.
    ///
    /// # Panics
    ///
    /// Panics if the intake queue rejects a byte.
    pub fn feed(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.producer
                .push_from_isr(byte)
                .expect("intake rejected byte");
        }
    }

    /// Run one loop iteration.
    pub fn step(&mut self) -> PollOutcome { self.processor.poll_once() }

    /// Run iterations until one makes no progress.
    pub fn settle(&mut self) {
        while self.processor.poll_once().made_progress() {}
    }

    /// Encoded frames emitted since the last call.
    pub fn sent(&mut self) -> Vec<Vec<u8>> {
        self.outbound
            .drain()
            .iter()
            .map(|frame| frame.as_bytes().to_vec())
            .collect()
    }

    /// Producer handle for tests that need to push from elsewhere.
    #[must_use]
    pub fn producer(&self) -> &IntakeProducer { &self.producer }

    /// Loop statistics.
    #[must_use]
    pub fn stats(&self) -> ProcessorStats { self.processor.stats() }

    /// Pending timeouts.
    #[must_use]
    pub fn timeouts(&self) -> &TimeoutTable { self.processor.timeouts() }
}

/// Encode an ADD request.
#[must_use]
pub fn add_request(a: u16, b: u16) -> Vec<u8> {
    let mut bytes = vec![0x24];
    bytes.extend_from_slice(&a.to_be_bytes());
    bytes.extend_from_slice(&b.to_be_bytes());
    bytes
}

/// Encode a DELAY request of `units` ticks echoing `payload`.
#[must_use]
pub fn delay_request(units: u16, payload: u8) -> Vec<u8> {
    let mut bytes = vec![0x43];
    bytes.extend_from_slice(&units.to_be_bytes());
    bytes.push(payload);
    bytes
}

/// Encode a LOG request.
///
/// # Panics
///
/// Panics if `text` is longer than fifteen bytes.
#[must_use]
pub fn log_request(text: &str) -> Vec<u8> {
    let len = u8::try_from(text.len())
        .ok()
        .filter(|len| *len <= 15)
        .expect("log text must fit in a frame");
    let mut bytes = vec![0x60 | len];
    bytes.extend_from_slice(text.as_bytes());
    bytes
}
