//! End-to-end scenarios for the tick loop, sub-states, watchdog and recovery.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use tickstate::core::TransitionKind;
use tickstate::machine::{ExitEvent, MachineError, Misuse, Recovering, StateMachine};
use tickstate::{state_enum, StateMachineBuilder};

state_enum! {
    enum Ball {
        A,
        B,
        F,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("accelerometer returned garbage")]
struct SensorGlitch;

fn watchdog_machine(limit: u32) -> StateMachine<Ball> {
    StateMachineBuilder::new()
        .initial(Ball::A)
        .watchdog_limit(limit)
        .build()
        .unwrap()
}

#[test]
fn single_switch_per_tick_never_trips_watchdog() {
    let mut handler = |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        if !sm.enter_state() {
            match state {
                Ball::A => sm.switch_state(Ball::B),
                Ball::B => sm.switch_state(Ball::A),
                Ball::F => {}
            }
        }
        Ok(())
    };
    let mut sm = watchdog_machine(5);

    // after the first tick every tick runs one exit pass and one enter pass
    for _ in 0..20 {
        sm.tick(&mut handler, 0.016).unwrap();
    }
    assert_eq!(sm.watchdog().runs_this_tick(), 2);
}

#[test]
fn self_switch_loop_trips_watchdog() {
    let invocations = Rc::new(RefCell::new(0));
    let counted = invocations.clone();
    let mut handler = move |_: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        *counted.borrow_mut() += 1;
        sm.switch_state(Ball::A);
        Ok(())
    };
    let mut sm = watchdog_machine(5);

    let err = sm.tick(&mut handler, 0.016).unwrap_err();

    match err {
        MachineError::WatchdogTripped {
            state, runs, limit, ..
        } => {
            assert_eq!(state, "A");
            assert_eq!(runs, 6);
            assert_eq!(limit, 5);
        }
        other => panic!("Expected watchdog trip, got {other}"),
    }
    assert_eq!(*invocations.borrow(), 5);
    assert!(!sm.currently_executing());
    assert!(!sm.ended());
}

#[test]
fn disabled_watchdog_lets_long_chain_finish() {
    let mut remaining = 1_000;
    let mut handler = move |_: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        if remaining > 0 {
            remaining -= 1;
            sm.switch_state(Ball::A);
        }
        Ok(())
    };
    let mut sm = watchdog_machine(5);
    sm.set_watchdog_enabled(false);

    sm.tick(&mut handler, 0.016).unwrap();

    assert_eq!(sm.current_state(), &Ball::A);
    assert_eq!(sm.frames_in_state(), 1);
}

#[test]
fn push_from_state_then_pop_returns_to_caller() {
    let mut pushed = false;
    let mut handler = move |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        match state {
            Ball::A if !pushed => {
                pushed = true;
                sm.push_state(Ball::B);
            }
            Ball::B if !sm.enter_state() => {
                assert!(sm.is_pushed_state());
                sm.pop_state();
            }
            _ => {}
        }
        Ok(())
    };
    let mut sm = StateMachine::new(Ball::A);

    sm.tick(&mut handler, 0.1).unwrap();
    assert_eq!(sm.current_state(), &Ball::B);
    assert_eq!(sm.sub_state_depth(), 1);

    sm.tick(&mut handler, 0.1).unwrap();
    assert_eq!(sm.current_state(), &Ball::A);
    assert!(!sm.is_pushed_state());
    assert_eq!(sm.sub_state_depth(), 0);
    assert_eq!(sm.misuse_count(), 0);
}

#[test]
fn failing_state_is_replaced_without_exit_notification() {
    let runs = Rc::new(RefCell::new(Vec::new()));
    let runs_seen = runs.clone();
    let mut b_ticks = 0;
    let body = move |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), SensorGlitch> {
        runs_seen.borrow_mut().push((*state, sm.enter_state()));
        match state {
            Ball::A => sm.switch_state(Ball::B),
            Ball::B => {
                b_ticks += 1;
                if b_ticks == 3 {
                    return Err(SensorGlitch);
                }
            }
            Ball::F => {}
        }
        Ok(())
    };
    let mut handler = Recovering::new(body, |_: &Ball, _: &SensorGlitch| Some(Ball::F));
    let exits = Rc::new(RefCell::new(Vec::new()));
    let exits_seen = exits.clone();
    let mut sm = StateMachine::new(Ball::A);
    sm.on_exit(move |event: &ExitEvent<Ball>| exits_seen.borrow_mut().push(event.from));

    // tick 1: A -> B (B's first run); ticks 2 and 3: B runs again and fails
    for _ in 0..3 {
        sm.tick(&mut handler, 0.1).unwrap();
    }
    sm.tick(&mut handler, 0.1).unwrap();

    assert_eq!(sm.current_state(), &Ball::F);
    assert_eq!(runs.borrow().last(), Some(&(Ball::F, true)));
    assert_eq!(*exits.borrow(), vec![Ball::A]);
    let kinds: Vec<TransitionKind> = sm.history().records().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![TransitionKind::Switch, TransitionKind::Replace]);
}

#[test]
fn unrecovered_failure_propagates_to_host() {
    let mut handler = |_: &Ball, _: &mut StateMachine<Ball>| -> Result<(), SensorGlitch> {
        Err(SensorGlitch)
    };
    let mut sm = StateMachine::new(Ball::A);

    let err = sm.tick(&mut handler, 0.1).unwrap_err();

    assert!(err.state_error().is_some());
    assert!(!sm.currently_executing());
}

#[test]
fn ended_machine_reports_further_ticks() {
    let mut handler = |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        if *state == Ball::A {
            sm.switch_state(Ball::B);
        }
        Ok(())
    };
    let mut sm = StateMachine::new(Ball::A);
    sm.tick(&mut handler, 0.1).unwrap();

    sm.end(&mut handler).unwrap();
    assert!(sm.ended());
    sm.tick(&mut handler, 0.1).unwrap();
    sm.switch_state_external_delayed(Ball::F);
    sm.tick(&mut handler, 0.1).unwrap();

    assert_eq!(sm.current_state(), &Ball::B);
    assert_eq!(sm.last_misuse(), Some(Misuse::TickAfterEnd));
    assert_eq!(sm.misuse_count(), 3);
}

#[test]
fn end_fires_exit_then_end_before_final_pass() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let on_exit = order.clone();
    let on_end = order.clone();
    let in_state = order.clone();
    let mut handler = move |_: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        if sm.exit_state() && !sm.enter_state() {
            in_state.borrow_mut().push("final pass");
        }
        Ok(())
    };
    let mut sm = StateMachine::new(Ball::A);
    sm.on_exit(move |event: &ExitEvent<Ball>| {
        assert_eq!(event.to, None);
        on_exit.borrow_mut().push("exit");
    });
    sm.on_end(move |_: &Ball| on_end.borrow_mut().push("end"));

    sm.end(&mut handler).unwrap();

    assert_eq!(*order.borrow(), vec!["exit", "end", "final pass"]);
}

#[test]
fn time_in_state_passed_fires_once_per_activation() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let fired_seen = fired.clone();
    let mut handler = move |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
        if sm.time_in_state_passed(0.3) {
            fired_seen.borrow_mut().push(*state);
        }
        if *state == Ball::A && sm.time_in_state() >= 1.0 {
            sm.switch_state(Ball::B);
        }
        Ok(())
    };
    let mut sm = StateMachine::new(Ball::A);

    for _ in 0..20 {
        sm.tick(&mut handler, 0.1).unwrap();
    }

    assert_eq!(*fired.borrow(), vec![Ball::A, Ball::B]);
}
