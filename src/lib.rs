//! Tickstate: a cooperative, frame-driven state machine runtime
//!
//! Tickstate runs per-frame logic as a set of named states. The host ticks
//! the machine once per frame; the current state runs, may request a
//! transition, and the requested state runs within the same tick without
//! being charged any elapsed time.
//!
//! # Core Concepts
//!
//! - **State**: an identity implementing the `State` trait, usually a
//!   fieldless enum declared with `state_enum!`
//! - **Handler**: the behavior bound to states; receives the machine so a
//!   state body can read its flags and request transitions
//! - **Enter/Exit passes**: the first run after a state becomes current and
//!   the last run before it is replaced
//! - **Sub-states**: push/pop call-and-return over states
//! - **Watchdog**: aborts ticks that chain transitions without end
//! - **Recovery**: `Recovering` redirects failing states to a fallback
//!
//! # Example
//!
//! ```rust
//! use std::convert::Infallible;
//! use tickstate::machine::StateMachine;
//! use tickstate::state_enum;
//!
//! state_enum! {
//!     enum Ball {
//!         InHand,
//!         Flying,
//!         Falling,
//!     }
//! }
//!
//! let mut handler = |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
//!     match state {
//!         Ball::InHand if sm.time_in_state() > 1.0 => sm.switch_state(Ball::Flying),
//!         Ball::Flying if sm.time_in_state_passed(0.5) => sm.switch_state(Ball::Falling),
//!         _ => {}
//!     }
//!     Ok(())
//! };
//!
//! let mut sm = StateMachine::new(Ball::InHand);
//! for _ in 0..10 {
//!     sm.tick(&mut handler, 0.25).unwrap();
//! }
//! assert_eq!(sm.current_state(), &Ball::Falling);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod host;
pub mod machine;

// Re-export commonly used types
pub use builder::StateMachineBuilder;
pub use config::MachineConfig;
pub use self::core::{State, TimeSource};
pub use host::Runner;
pub use machine::{Handler, MachineError, Misuse, Recovering, StateMachine};
