//! Core State trait for state machine states.
//!
//! A state is an identity: a small value the machine stores as "current",
//! compares for equality and prints in diagnostics. The behavior bound to
//! each state lives in a [`Handler`](crate::machine::Handler), which the
//! machine dispatches to on every run.

use std::fmt::Debug;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: the machine clones the current state before handing it to the
///   handler, so the handler may freely request a replacement
/// - `PartialEq`: hosts compare states (e.g. "already in the end state?")
/// - `Debug`: states must be debuggable for diagnostics
///
/// # Example
///
/// ```rust
/// use tickstate::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum PlayerState {
///     Idle,
///     Running,
///     Jumping,
/// }
///
/// impl State for PlayerState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Running => "Running",
///             Self::Jumping => "Jumping",
///         }
///     }
/// }
///
/// assert_eq!(PlayerState::Jumping.name(), "Jumping");
/// ```
pub trait State: Clone + PartialEq + Debug {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}
