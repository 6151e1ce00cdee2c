//! Failure recovery around state bodies.

use super::engine::StateMachine;
use super::handler::Handler;
use crate::core::State;

/// Handler decorator that redirects failing states to a recovery state.
///
/// When the wrapped handler fails, the failure is logged with the failing
/// state and tick, and `on_failure` is asked for a replacement. A replacement
/// is forced in through
/// [`replace_state_without_exit`](StateMachine::replace_state_without_exit):
/// no exit observers fire, the rest of the tick is abandoned, and the
/// replacement first runs on the next tick with the enter flag set. Without a
/// replacement the failure propagates to the caller of `tick`.
///
/// # Example
///
/// ```rust
/// use tickstate::machine::{Recovering, StateMachine};
/// use tickstate::state_enum;
///
/// state_enum! {
///     enum Game {
///         Playing,
///         Crashed,
///     }
/// }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("lost sensor")]
/// struct LostSensor;
///
/// let body = |state: &Game, _: &mut StateMachine<Game>| match state {
///     Game::Playing => Err(LostSensor),
///     Game::Crashed => Ok(()),
/// };
/// let mut handler = Recovering::new(body, |_: &Game, _: &LostSensor| Some(Game::Crashed));
///
/// let mut sm = StateMachine::new(Game::Playing);
/// sm.tick(&mut handler, 0.1).unwrap();
///
/// assert_eq!(sm.current_state(), &Game::Crashed);
/// assert!(sm.enter_state());
/// ```
pub struct Recovering<H, F> {
    inner: H,
    on_failure: F,
}

impl<H, F> Recovering<H, F> {
    pub fn new(inner: H, on_failure: F) -> Self {
        Self { inner, on_failure }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<S, H, F> Handler<S> for Recovering<H, F>
where
    S: State,
    H: Handler<S>,
    F: FnMut(&S, &H::Error) -> Option<S>,
{
    type Error = H::Error;

    fn run(&mut self, state: &S, machine: &mut StateMachine<S>) -> Result<(), H::Error> {
        let err = match self.inner.run(state, machine) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        tracing::warn!(
            machine = %machine,
            state = state.name(),
            tick = machine.tick_count(),
            error = %err,
            "state failed"
        );

        match (self.on_failure)(state, &err) {
            Some(recovery) => {
                if machine.logging_enabled() {
                    tracing::debug!(
                        machine = %machine,
                        to = recovery.name(),
                        "recovering from failed state"
                    );
                }
                machine.replace_state_without_exit(recovery);
                Ok(())
            }
            None => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{ExitEvent, MachineError};
    use crate::state_enum;
    use std::cell::RefCell;
    use std::rc::Rc;
    use thiserror::Error;

    state_enum! {
        enum TestState {
            Steady,
            Flaky,
            Fallback,
        }
    }

    #[derive(Debug, Error, PartialEq)]
    #[error("flaky state failed on run {0}")]
    struct Flake(u32);

    #[test]
    fn failure_redirects_to_recovery_state_on_next_tick() {
        let runs = Rc::new(RefCell::new(Vec::new()));
        let runs_seen = runs.clone();
        let mut flaky_runs = 0;
        let body = move |state: &TestState, sm: &mut StateMachine<TestState>| {
            runs_seen
                .borrow_mut()
                .push((state.clone(), sm.enter_state()));
            if *state == TestState::Flaky {
                flaky_runs += 1;
                if flaky_runs == 2 {
                    sm.switch_state(TestState::Steady);
                    return Err(Flake(flaky_runs));
                }
            }
            Ok(())
        };
        let mut handler = Recovering::new(body, |_: &TestState, _: &Flake| {
            Some(TestState::Fallback)
        });
        let exits = Rc::new(RefCell::new(0));
        let exits_seen = exits.clone();
        let mut sm = StateMachine::new(TestState::Flaky);
        sm.on_exit(move |_: &ExitEvent<TestState>| *exits_seen.borrow_mut() += 1);

        sm.tick(&mut handler, 0.1).unwrap();
        sm.tick(&mut handler, 0.1).unwrap();
        assert_eq!(sm.current_state(), &TestState::Fallback);
        assert!(sm.enter_state());
        assert_eq!(sm.frames_in_state(), 0);

        sm.tick(&mut handler, 0.1).unwrap();

        assert_eq!(
            *runs.borrow(),
            vec![
                (TestState::Flaky, true),
                (TestState::Flaky, false),
                (TestState::Fallback, true),
            ]
        );
        // only the switch requested before the failure notified observers
        assert_eq!(*exits.borrow(), 1);
    }

    #[test]
    fn recovery_state_is_not_a_pushed_state() {
        let body = |state: &TestState, sm: &mut StateMachine<TestState>| -> Result<(), Flake> {
            match state {
                TestState::Steady => sm.push_state(TestState::Flaky),
                TestState::Flaky => return Err(Flake(1)),
                TestState::Fallback => {}
            }
            Ok(())
        };
        let mut handler = Recovering::new(body, |_: &TestState, _: &Flake| {
            Some(TestState::Fallback)
        });
        let mut sm = StateMachine::new(TestState::Steady);

        sm.tick(&mut handler, 0.1).unwrap();

        assert_eq!(sm.current_state(), &TestState::Fallback);
        assert!(!sm.is_pushed_state());
        assert_eq!(sm.sub_state_depth(), 1);
    }

    #[test]
    fn declined_recovery_propagates_failure() {
        let body = |_: &TestState, _: &mut StateMachine<TestState>| -> Result<(), Flake> {
            Err(Flake(1))
        };
        let mut handler = Recovering::new(body, |_: &TestState, _: &Flake| None);
        let mut sm = StateMachine::new(TestState::Flaky);

        let err = sm.tick(&mut handler, 0.1).unwrap_err();

        match err {
            MachineError::StateFailed {
                state, tick, source, ..
            } => {
                assert_eq!(state, "Flaky");
                assert_eq!(tick, 1);
                assert_eq!(source, Flake(1));
            }
            other => panic!("Expected state failure, got {other}"),
        }
        assert!(!sm.currently_executing());
        assert_eq!(sm.current_state(), &TestState::Flaky);
    }

    #[test]
    fn recovery_function_sees_failing_state_and_error() {
        let seen = Rc::new(RefCell::new(None));
        let seen_in_hook = seen.clone();
        let body = |state: &TestState, _: &mut StateMachine<TestState>| match state {
            TestState::Flaky => Err(Flake(7)),
            _ => Ok(()),
        };
        let mut handler = Recovering::new(body, move |state: &TestState, err: &Flake| {
            *seen_in_hook.borrow_mut() = Some((state.clone(), err.0));
            Some(TestState::Fallback)
        });
        let mut sm = StateMachine::new(TestState::Flaky);

        sm.tick(&mut handler, 0.1).unwrap();

        assert_eq!(*seen.borrow(), Some((TestState::Flaky, 7)));
        assert_eq!(sm.current_state(), &TestState::Fallback);
    }
}
