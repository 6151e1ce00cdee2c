//! Core state machine types.
//!
//! This module contains the building blocks the runtime is assembled from:
//! - State identity via the `State` trait
//! - The per-tick `Watchdog`
//! - Elapsed-time sources
//! - The bounded transition log

mod history;
mod state;
mod time;
mod watchdog;

pub use history::{TransitionKind, TransitionLog, TransitionRecord};
pub use state::State;
pub use time::{FixedStep, TimeSource, WallClock, DEFAULT_DELTA_TIME};
pub use watchdog::{Watchdog, WatchdogTrip, DEFAULT_WATCHDOG_LIMIT};
