//! Line-oriented diagnostic sink.
//!
//! LOG payloads and protocol violations are written here. The sink is
//! fire-and-forget: writing never fails and never blocks the loop.

use tracing::info;

/// Tracing target used by [`TracingDiagnostics`].
pub const DIAGNOSTICS_TARGET: &str = "nibbleframe::diagnostics";

/// Destination for human-readable diagnostic lines.
pub trait Diagnostics: Send {
    /// Record one line of text.
    fn write(&self, line: &str);
}

/// Diagnostics forwarded as `info` events on [`DIAGNOSTICS_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn write(&self, line: &str) {
        info!(target: DIAGNOSTICS_TARGET, "{line}");
    }
}

impl<D: Diagnostics + Sync + ?Sized> Diagnostics for std::sync::Arc<D> {
    fn write(&self, line: &str) { (**self).write(line); }
}
