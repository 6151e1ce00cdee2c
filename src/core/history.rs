//! Bounded log of recent transitions.
//!
//! Diagnostic only: the log keeps the last `capacity` transitions so a host
//! can show how a machine arrived at its current state.

use super::state::State;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// How a transition was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Plain switch, in-state or external.
    Switch,
    /// Entered a sub-state via push.
    Push,
    /// Returned from a sub-state via pop.
    Pop,
    /// Forced replacement after a recovered failure; no exit pass ran.
    Replace,
    /// Final pass of an ending machine.
    End,
}

/// Record of a single transition request.
///
/// # Example
///
/// ```rust
/// use tickstate::core::{State, TransitionKind, TransitionRecord};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Door {
///     Closed,
///     Open,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///         }
///     }
/// }
///
/// let record = TransitionRecord {
///     from: Door::Closed,
///     to: Door::Open,
///     kind: TransitionKind::Switch,
///     tick: 3,
///     at: Utc::now(),
/// };
/// assert_eq!(record.to.name(), "Open");
/// ```
#[derive(Clone, Debug)]
pub struct TransitionRecord<S: State> {
    /// The state that was current when the transition was requested
    pub from: S,
    /// The state requested
    pub to: S,
    pub kind: TransitionKind,
    /// Machine tick count at the time of the request
    pub tick: u64,
    /// Wall-clock time of the request
    pub at: DateTime<Utc>,
}

/// Ring buffer of the most recent transitions.
///
/// A capacity of zero disables recording.
#[derive(Clone, Debug)]
pub struct TransitionLog<S: State> {
    capacity: usize,
    records: VecDeque<TransitionRecord<S>>,
}

impl<S: State> TransitionLog<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records in the order they were made, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<S>> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord<S>> {
        self.records.back()
    }

    /// Path of states covered by the retained records: the origin of the
    /// oldest record, then the target of every record.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        path.extend(self.records.iter().map(|record| &record.to));
        path
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
