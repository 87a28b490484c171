//! Counters exposed by the processing loop.

/// Running totals for a [`super::Processor`].
///
/// Every silent-loss path in the protocol has a counter here: bytes dropped
/// by a full intake, DELAY requests dropped by a full timeout table, and
/// responses dropped by a full or closed outbound channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Frames assembled and dispatched.
    pub frames_received: u64,
    /// Response frames queued for the transport.
    pub responses_sent: u64,
    /// Deferred responses whose deadline passed.
    pub timeouts_fired: u64,
    /// Frames rejected as unknown, response-only or malformed.
    pub protocol_violations: u64,
    /// DELAY requests discarded because every timeout slot was occupied.
    pub delays_rejected: u64,
    /// Response frames that never reached the outbound queue.
    pub outbound_dropped: u64,
    /// Bytes the producer dropped because the intake queue was full.
    pub intake_dropped: u64,
}
