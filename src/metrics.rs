//! Metric helpers for `nibbleframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to nothing.

use crate::error::ErrorKind;

/// Name of the counter tracking processed frames.
pub const FRAMES_PROCESSED: &str = "nibbleframe_frames_processed_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "nibbleframe_errors_total";
/// Name of the gauge tracking occupied timeout slots.
pub const TIMEOUTS_PENDING: &str = "nibbleframe_timeouts_pending";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Frames assembled from the intake queue.
    Inbound,
    /// Frames handed to the outbound channel.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only used as a label"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record an error occurrence.
pub fn inc_errors(kind: ErrorKind) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ERRORS_TOTAL, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Publish the number of occupied timeout slots.
pub fn set_timeouts_pending(pending: usize) {
    #[cfg(feature = "metrics")]
    metrics::gauge!(TIMEOUTS_PENDING).set(f64::from(u32::try_from(pending).unwrap_or(u32::MAX)));
    #[cfg(not(feature = "metrics"))]
    let _ = pending;
}
