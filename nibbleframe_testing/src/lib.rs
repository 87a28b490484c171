//! Utilities for driving a [`Processor`](nibbleframe::Processor) in tests.
//!
//! The helpers wrap the producer and outbound ends of a processor so tests
//! can push raw bytes, advance time and read back encoded responses.
//!
//! ```rust
//! use nibbleframe_testing::{ManualClock, RecordingDiagnostics, TestRig};
//!
//! let mut rig = TestRig::new(ManualClock::new(), RecordingDiagnostics::default());
//! rig.feed(&[0x10]);
//! rig.step();
//! assert_eq!(rig.sent(), vec![vec![0x10]]);
//! ```

mod clock;
mod diagnostics;
pub mod logging;
mod macros;
mod rig;

pub use clock::ManualClock;
pub use diagnostics::RecordingDiagnostics;
pub use logging::{LoggerHandle, logger};
pub use rig::{TestRig, add_request, delay_request, log_request};
