//! Failures and misuse reports raised by the runtime.

use thiserror::Error;

/// Failures that abort the current tick.
#[derive(Debug, Error)]
pub enum MachineError<E>
where
    E: std::error::Error + 'static,
{
    /// A single tick invoked states more often than the watchdog allows.
    #[error("{machine} watchdog triggered in state '{state}' ({runs} runs this tick, limit {limit})")]
    WatchdogTripped {
        machine: String,
        state: String,
        runs: u32,
        limit: u32,
    },

    /// A state body returned an error and no recovery state was provided.
    #[error("{machine} state '{state}' failed at tick {tick}")]
    StateFailed {
        machine: String,
        state: String,
        tick: u64,
        #[source]
        source: E,
    },
}

impl<E> MachineError<E>
where
    E: std::error::Error + 'static,
{
    /// The error returned by the failing state body, if any.
    pub fn state_error(&self) -> Option<&E> {
        match self {
            Self::StateFailed { source, .. } => Some(source),
            Self::WatchdogTripped { .. } => None,
        }
    }

    pub fn is_watchdog(&self) -> bool {
        matches!(self, Self::WatchdogTripped { .. })
    }
}

/// Operations used outside their intended context.
///
/// A misuse never aborts anything: the operation completes with its
/// documented fallback and the misuse is logged and recorded on the machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Misuse {
    #[error("switched state from outside of a state (use an external switch if this is not a bug)")]
    SwitchOutsideState,

    #[error("used an external switch from inside of a state (use switch_state if this is not a bug)")]
    ExternalSwitchInsideState,

    #[error("switched state on an ended machine")]
    SwitchOnEnded,

    #[error("popped state with an empty sub-state stack")]
    PopOnEmptyStack,

    #[error("ended, but still updating")]
    TickAfterEnd,

    #[error("ended from outside of a state (use end() if this is not a bug)")]
    EndOutsideState,

    #[error("delta time must be finite and non-negative; clamped to zero")]
    InvalidDeltaTime,
}

/// Returned by [`StateMachine::assert_pushed_state`](super::StateMachine::assert_pushed_state).
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("assertion failed: expected pushed state = {expected}")]
pub struct PushedStateMismatch {
    pub expected: bool,
}
