#![doc(html_root_url = "https://docs.rs/nibbleframe/latest")]
//! Public API for the `nibbleframe` library.
//!
//! This crate implements the receive side of a compact serial protocol: bytes
//! arrive one at a time from an interrupt-style producer, are reassembled
//! into frames with a four-bit command and four-bit length header, and each
//! frame is executed to produce zero or one response. DELAY requests are
//! answered later from a fixed table of eight pending timeouts.

pub mod assembler;
pub mod byte_order;
pub mod clock;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod intake;
pub mod metrics;
pub mod outbound;
pub mod processor;
pub mod timeouts;

pub use assembler::{AssemblerState, FrameAssembler};
pub use clock::{Clock, TokioClock};
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use dispatch::{CommandDispatcher, Dispatch, DispatchError};
pub use error::{ErrorKind, ProcessorError};
pub use frame::{CommandType, Frame, FrameError, Header};
pub use intake::{ByteSource, IntakeError, IntakeProducer, IntakeQueue, intake_channel};
pub use metrics::{Direction, ERRORS_TOTAL, FRAMES_PROCESSED, TIMEOUTS_PENDING};
pub use outbound::{OutboundError, OutboundHandle, OutboundQueue, SendOutcome, SendPolicy, outbound_channel};
pub use processor::{PollOutcome, Processor, ProcessorBuilder, ProcessorConfigError, ProcessorStats};
pub use timeouts::{TIMEOUT_CAPACITY, TimeoutTable};
