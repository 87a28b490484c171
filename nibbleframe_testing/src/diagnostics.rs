//! Diagnostic sink that keeps every line for later assertions.

use std::sync::{Arc, Mutex};

use nibbleframe::Diagnostics;

/// Records diagnostic lines in memory. Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct RecordingDiagnostics {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingDiagnostics {
    /// Remove and return the recorded lines.
    ///
    /// # Panics
    ///
    /// Panics if the record mutex is poisoned.
    #[must_use]
    pub fn take(&self) -> Vec<String> { std::mem::take(&mut *self.lines.lock().expect("lines poisoned")) }
}

impl Diagnostics for RecordingDiagnostics {
    fn write(&self, line: &str) {
        self.lines
            .lock()
            .expect("lines poisoned")
            .push(line.to_owned());
    }
}
