//! Observer payloads.

use crate::core::{State, TransitionKind};

/// Delivered to exit observers just before a transition is committed.
#[derive(Clone, Debug, PartialEq)]
pub struct ExitEvent<S: State> {
    /// The state about to run its exit pass
    pub from: S,
    /// The state that will run next; `None` when the machine is ending
    pub to: Option<S>,
    pub kind: TransitionKind,
}

pub(crate) type ExitHook<S> = Box<dyn FnMut(&ExitEvent<S>)>;
pub(crate) type ExitOnceHook<S> = Box<dyn FnOnce(&ExitEvent<S>)>;
pub(crate) type EndHook<S> = Box<dyn FnMut(&S)>;
