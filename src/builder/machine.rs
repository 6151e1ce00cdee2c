//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::{State, TimeSource};
use crate::machine::StateMachine;
use stillwater::validation::Validation;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```
/// use tickstate::builder::StateMachineBuilder;
/// use tickstate::state_enum;
///
/// state_enum! {
///     enum Ball {
///         InHand,
///         Flying,
///     }
/// }
///
/// let sm = StateMachineBuilder::new()
///     .initial(Ball::InHand)
///     .name("Ball")
///     .watchdog_limit(10)
///     .build()
///     .unwrap();
///
/// assert_eq!(sm.watchdog().limit(), 10);
/// assert!(sm.to_string().starts_with("[Ball#"));
/// ```
pub struct StateMachineBuilder<S: State> {
    initial: Option<S>,
    config: MachineConfig,
    time_source: Option<Box<dyn TimeSource>>,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            initial: None,
            config: MachineConfig::default(),
            time_source: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.logging_enabled = enabled;
        self
    }

    pub fn watchdog_enabled(mut self, enabled: bool) -> Self {
        self.config.watchdog_enabled = enabled;
        self
    }

    pub fn watchdog_limit(mut self, limit: u32) -> Self {
        self.config.watchdog_limit = limit;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Use a custom source for [`tick_default`](StateMachine::tick_default)
    /// instead of a fixed step of `default_delta_time`.
    pub fn time_source<T>(mut self, source: T) -> Self
    where
        T: TimeSource + 'static,
    {
        self.time_source = Some(Box::new(source));
        self
    }

    /// Build the state machine.
    /// Returns an error if the initial state is missing or the configuration
    /// is invalid; every configuration problem is reported at once.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if let Validation::Failure(errors) = self.config.validate() {
            return Err(BuildError::InvalidConfig {
                problems: errors.iter().cloned().collect(),
            });
        }

        let mut machine = StateMachine::from_config(initial, self.config);
        if let Some(source) = self.time_source {
            machine.set_boxed_time_source(source);
        }
        Ok(machine)
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
