//! Hand-driven clock for deterministic deadline tests.

use std::sync::{Arc, Mutex};

use nibbleframe::Clock;
use tokio::time::{Duration, Instant};

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle while the
/// processor owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Start at the current Tokio instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move time forward.
    ///
    /// # Panics
    ///
    /// Panics if the clock mutex is poisoned.
    pub fn advance(&self, by: Duration) { *self.now.lock().expect("clock poisoned") += by; }

    /// Move time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) { self.advance(Duration::from_millis(ms)); }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { *self.now.lock().expect("clock poisoned") }
}
