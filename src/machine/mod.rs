//! The state machine runtime.
//!
//! - [`StateMachine`]: the tick loop, transitions, end protocol and timing
//! - Sub-state push/pop, layered on the same transition request
//! - [`Handler`]: the behavior bound to states
//! - [`Recovering`]: failure recovery around a handler
//!
//! Everything here is single-threaded and synchronous: a tick runs every
//! same-tick transition to completion before returning.

mod engine;
mod error;
mod events;
mod handler;
mod recovery;
mod snapshot;
mod stack;

pub use engine::StateMachine;
pub use error::{MachineError, Misuse, PushedStateMismatch};
pub use events::ExitEvent;
pub use handler::Handler;
pub use recovery::Recovering;
pub use snapshot::MachineSnapshot;
