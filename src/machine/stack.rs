//! Sub-state machines: call/return over states.
//!
//! Pushing remembers where to come back to; popping transitions there. Both
//! use the ordinary transition request, so they are delayed to the next tick
//! when used from outside a state.

use super::engine::StateMachine;
use super::error::{Misuse, PushedStateMismatch};
use crate::core::{State, TransitionKind};

impl<S: State> StateMachine<S> {
    /// Enter `inner` as a sub-state, returning to the current state on pop.
    pub fn push_state(&mut self, inner: S) {
        let return_to = self.current_state().clone();
        self.push_state_returning_to(inner, return_to);
    }

    /// Enter `inner` as a sub-state, returning to `return_to` on pop.
    pub fn push_state_returning_to(&mut self, inner: S, return_to: S) {
        if self.refuse_if_ended() {
            return;
        }
        if self.logging_enabled() {
            tracing::debug!(
                machine = %self,
                from = self.state_name(),
                to = inner.name(),
                depth = self.stack.len() + 1,
                "push state"
            );
        }
        self.stack.push(return_to);
        self.pushed = true;
        self.request_transition(inner, TransitionKind::Push);
    }

    /// Leave the current sub-state, returning to the most recent push.
    ///
    /// On an empty stack this is reported as [`Misuse::PopOnEmptyStack`]
    /// and no transition occurs.
    pub fn pop_state(&mut self) {
        if self.refuse_if_ended() {
            return;
        }
        let Some(return_to) = self.stack.pop() else {
            self.report(Misuse::PopOnEmptyStack);
            return;
        };

        if self.logging_enabled() {
            tracing::debug!(
                machine = %self,
                from = self.state_name(),
                to = return_to.name(),
                depth = self.stack.len(),
                "pop state"
            );
        }
        self.pushed = !self.stack.is_empty();
        self.request_transition(return_to, TransitionKind::Pop);
    }

    /// Number of pushes not yet popped; 0 when no sub-state is active.
    pub fn sub_state_depth(&self) -> usize {
        self.stack.len()
    }

    /// Was the current state reached through a push?
    pub fn is_pushed_state(&self) -> bool {
        self.pushed
    }

    /// Sanity check for states that only make sense as sub-states (or only
    /// as top-level states).
    pub fn assert_pushed_state(&self, expected: bool) -> Result<(), PushedStateMismatch> {
        if self.pushed == expected {
            Ok(())
        } else {
            Err(PushedStateMismatch { expected })
        }
    }
}
