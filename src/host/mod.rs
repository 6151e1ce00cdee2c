//! Host-side driver: owns a machine together with its handler.
//!
//! A game entity typically holds one [`Runner`], calls
//! [`update`](Runner::update) once per frame and
//! [`shutdown`](Runner::shutdown) when it is torn down.

use crate::core::State;
use crate::machine::{Handler, MachineError, StateMachine};

/// Drives one machine with one handler.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
/// use tickstate::host::Runner;
/// use tickstate::machine::StateMachine;
/// use tickstate::state_enum;
///
/// state_enum! {
///     enum Entity {
///         Alive,
///         Dead,
///     }
/// }
///
/// let handler = |state: &Entity, sm: &mut StateMachine<Entity>| -> Result<(), Infallible> {
///     if *state == Entity::Dead && sm.enter_state() {
///         sm.end_from_state();
///     }
///     Ok(())
/// };
///
/// let mut runner = Runner::new("Enemy", StateMachine::new(Entity::Alive), handler);
/// runner.update().unwrap();
/// assert_eq!(runner.label(), "Enemy@Alive +0");
///
/// runner.shutdown(Entity::Dead).unwrap();
/// assert!(runner.machine().ended());
/// ```
pub struct Runner<S: State, H> {
    name: String,
    machine: StateMachine<S>,
    handler: H,
}

impl<S, H> Runner<S, H>
where
    S: State,
    H: Handler<S>,
{
    pub fn new(name: impl Into<String>, machine: StateMachine<S>, handler: H) -> Self {
        Self {
            name: name.into(),
            machine,
            handler,
        }
    }

    /// Tick once with the elapsed time from the machine's time source.
    pub fn update(&mut self) -> Result<(), MachineError<H::Error>> {
        self.machine.tick_default(&mut self.handler)
    }

    /// Tick once with an explicit elapsed time.
    pub fn update_with(&mut self, delta_time: f32) -> Result<(), MachineError<H::Error>> {
        self.machine.tick(&mut self.handler, delta_time)
    }

    /// `<name>@<state> +<depth>`, suitable for an entity's debug name.
    pub fn label(&self) -> String {
        format!(
            "{}@{} +{}",
            self.name,
            self.machine.state_name(),
            self.machine.sub_state_depth()
        )
    }

    /// Drive the machine into `end_state` so it can run its teardown.
    ///
    /// Does nothing when the machine has ended or already sits in
    /// `end_state`. Otherwise switches immediately, so `end_state` runs
    /// before this returns; `end_state` is expected to end the machine.
    pub fn shutdown(&mut self, end_state: S) -> Result<(), MachineError<H::Error>> {
        if self.machine.ended() || *self.machine.current_state() == end_state {
            return Ok(());
        }
        self.machine
            .switch_state_external_immediate(end_state, &mut self.handler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine(&self) -> &StateMachine<S> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut StateMachine<S> {
        &mut self.machine
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_parts(self) -> (StateMachine<S>, H) {
        (self.machine, self.handler)
    }
}
