//! Monotonic time source used for DELAY deadlines.

use tokio::time::Instant;

/// Source of monotonic time for the processing loop.
pub trait Clock: Send {
    /// Current monotonic time.
    fn now(&self) -> Instant;
}

/// Clock backed by the Tokio timer, so paused test time is honoured.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant { Instant::now() }
}

impl<C: Clock + Sync + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant { (**self).now() }
}
