//! Command execution for assembled frames.
//!
//! [`CommandDispatcher::dispatch`] runs once per completed frame. It either
//! builds an immediate response, installs a deferred one in the
//! [`TimeoutTable`], writes to the diagnostic sink, or rejects the frame with
//! a [`DispatchError`]. No command waits; the only loop is the fixed scan
//! for a free timeout slot.

mod error;

pub use error::DispatchError;
use tokio::time::{Duration, Instant};

use crate::{
    byte_order::{read_network_u16_at, write_network_u16},
    diagnostics::Diagnostics,
    frame::{CommandType, Frame},
    timeouts::TimeoutTable,
};

/// Default length of one DELAY time unit.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1);

const ADD_PAYLOAD_LEN: usize = 4;
const DELAY_PAYLOAD_LEN: usize = 3;

/// Result of dispatching a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Emit this frame immediately.
    Respond(Frame),
    /// A TIMEOUT frame will be emitted from `slot` once `deadline` passes.
    Scheduled {
        /// Timeout table slot now holding the request.
        slot: usize,
        /// Instant at which the response becomes due.
        deadline: Instant,
    },
    /// The payload was written to the diagnostic sink; no response follows.
    Logged,
}

/// Executes commands carried by assembled frames.
#[derive(Clone, Copy, Debug)]
pub struct CommandDispatcher {
    tick: Duration,
}

impl Default for CommandDispatcher {
    fn default() -> Self { Self::new(DEFAULT_TICK) }
}

impl CommandDispatcher {
    /// Create a dispatcher measuring DELAY values in units of `tick`.
    #[must_use]
    pub const fn new(tick: Duration) -> Self { Self { tick } }

    /// Length of one DELAY time unit.
    #[must_use]
    pub const fn tick(&self) -> Duration { self.tick }

    /// Execute the command carried by `frame`.
    ///
    /// `now` is the time DELAY deadlines are measured from.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for unknown or response-only commands, for
    /// ADD and DELAY payloads of the wrong length, for a DELAY whose deadline
    /// overflows, and for a DELAY that finds every timeout slot occupied. The
    /// frame is not executed in any of these cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use nibbleframe::{
    ///     diagnostics::TracingDiagnostics,
    ///     dispatch::{CommandDispatcher, Dispatch},
    ///     frame::Frame,
    ///     timeouts::TimeoutTable,
    /// };
    /// use tokio::time::Instant;
    ///
    /// let dispatcher = CommandDispatcher::default();
    /// let mut table = TimeoutTable::new();
    /// let add = Frame::from_bytes(&[0x24, 0xFF, 0xFF, 0x00, 0x02]).expect("valid frame");
    /// let outcome = dispatcher
    ///     .dispatch(&add, Instant::now(), &mut table, &TracingDiagnostics)
    ///     .expect("add is valid");
    /// let Dispatch::Respond(result) = outcome else { panic!("expected a response") };
    /// assert_eq!(result.as_bytes(), &[0x32, 0x00, 0x01]);
    /// ```
    pub fn dispatch(
        &self,
        frame: &Frame,
        now: Instant,
        table: &mut TimeoutTable,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Dispatch, DispatchError> {
        let command = CommandType::try_from(frame.command_code()).map_err(|_| {
            DispatchError::UnknownCommand {
                code: frame.command_code(),
            }
        })?;
        match command {
            CommandType::Empty => Ok(Dispatch::Respond(*frame)),
            CommandType::Add => Self::add(frame).map(Dispatch::Respond),
            CommandType::Delay => self.delay(frame, now, table),
            CommandType::Log => {
                Self::log(frame, diagnostics);
                Ok(Dispatch::Logged)
            }
            CommandType::Result | CommandType::Timeout => {
                Err(DispatchError::ResponseOnly { command })
            }
        }
    }

    fn add(frame: &Frame) -> Result<Frame, DispatchError> {
        let payload = expect_len(frame, CommandType::Add, ADD_PAYLOAD_LEN)?;
        let (Some(a), Some(b)) = (read_network_u16_at(payload, 0), read_network_u16_at(payload, 2))
        else {
            return Err(malformed(CommandType::Add, ADD_PAYLOAD_LEN, payload.len()));
        };
        let sum = write_network_u16(a.wrapping_add(b));
        Ok(Frame::with_array(CommandType::Result, sum))
    }

    fn delay(
        &self,
        frame: &Frame,
        now: Instant,
        table: &mut TimeoutTable,
    ) -> Result<Dispatch, DispatchError> {
        let payload = expect_len(frame, CommandType::Delay, DELAY_PAYLOAD_LEN)?;
        let (Some(units), Some(&echo)) = (read_network_u16_at(payload, 0), payload.get(2)) else {
            return Err(malformed(CommandType::Delay, DELAY_PAYLOAD_LEN, payload.len()));
        };
        let deadline = self
            .tick
            .checked_mul(u32::from(units))
            .and_then(|delay| now.checked_add(delay))
            .ok_or(DispatchError::DelayOutOfRange { units, payload: echo })?;
        let slot = table
            .schedule(deadline, echo)
            .ok_or(DispatchError::TimeoutTableFull { payload: echo })?;
        Ok(Dispatch::Scheduled { slot, deadline })
    }

    fn log(frame: &Frame, diagnostics: &dyn Diagnostics) {
        let text = String::from_utf8_lossy(frame.payload());
        diagnostics.write(&format!("Log: {text}"));
    }
}

/// Build the TIMEOUT response for an expired DELAY.
#[must_use]
pub fn timeout_frame(payload: u8) -> Frame { Frame::with_byte(CommandType::Timeout, payload) }

fn expect_len(frame: &Frame, command: CommandType, expected: usize) -> Result<&[u8], DispatchError> {
    let payload = frame.payload();
    if payload.len() == expected {
        Ok(payload)
    } else {
        Err(malformed(command, expected, payload.len()))
    }
}

const fn malformed(command: CommandType, expected: usize, actual: usize) -> DispatchError {
    DispatchError::MalformedPayload {
        command,
        expected,
        actual,
    }
}
