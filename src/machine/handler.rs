//! The behavior bound to states.

use super::engine::StateMachine;
use crate::core::State;

/// Runs the body of whichever state is current.
///
/// The machine hands the handler a reference to itself, so a state body reads
/// flags such as [`enter_state`](StateMachine::enter_state) and requests
/// transitions through the same value. Implementations typically `match` on
/// the state and call one method per variant.
///
/// Any `FnMut(&S, &mut StateMachine<S>) -> Result<(), E>` closure is a
/// handler.
///
/// # Example
///
/// ```rust
/// use tickstate::machine::{Handler, StateMachine};
/// use tickstate::state_enum;
///
/// state_enum! {
///     enum Light {
///         Red,
///         Green,
///     }
/// }
///
/// struct Crossing {
///     cars_passed: u32,
/// }
///
/// impl Handler<Light> for Crossing {
///     type Error = std::convert::Infallible;
///
///     fn run(&mut self, state: &Light, sm: &mut StateMachine<Light>) -> Result<(), Self::Error> {
///         match state {
///             Light::Red => {
///                 if sm.time_in_state() > 2.0 {
///                     sm.switch_state(Light::Green);
///                 }
///             }
///             Light::Green => self.cars_passed += 1,
///         }
///         Ok(())
///     }
/// }
///
/// let mut crossing = Crossing { cars_passed: 0 };
/// let mut sm = StateMachine::new(Light::Red);
/// for _ in 0..4 {
///     sm.tick(&mut crossing, 1.0).unwrap();
/// }
/// assert_eq!(sm.current_state(), &Light::Green);
/// ```
pub trait Handler<S: State> {
    type Error: std::error::Error + 'static;

    fn run(&mut self, state: &S, machine: &mut StateMachine<S>) -> Result<(), Self::Error>;
}

impl<S, E, F> Handler<S> for F
where
    S: State,
    E: std::error::Error + 'static,
    F: FnMut(&S, &mut StateMachine<S>) -> Result<(), E>,
{
    type Error = E;

    fn run(&mut self, state: &S, machine: &mut StateMachine<S>) -> Result<(), E> {
        self(state, machine)
    }
}
