//! The frame-driven state machine.

use super::error::{MachineError, Misuse};
use super::events::{EndHook, ExitEvent, ExitHook, ExitOnceHook};
use super::handler::Handler;
use super::snapshot::MachineSnapshot;
use crate::config::MachineConfig;
use crate::core::{
    FixedStep, State, TimeSource, TransitionKind, TransitionLog, TransitionRecord, Watchdog,
};
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Diagnostic only; machines may be built from any thread.
static NEXT_MACHINE_ID: AtomicU64 = AtomicU64::new(1);

/// A cooperative, single-threaded state machine.
///
/// The host calls [`tick`](Self::tick) once per frame. Each tick runs the
/// current state through a [`Handler`]; when the state requests a
/// transition, the next state runs within the same tick with
/// [`enter_state`](Self::enter_state) set and a zero
/// [`delta_time`](Self::delta_time), until no transition is pending.
///
/// A state body follows a fixed shape: enter logic first, then per-frame
/// logic, then transition requests, then exit logic (the exit flag is only
/// raised by a transition request, so it must be read after one).
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
/// use tickstate::machine::StateMachine;
/// use tickstate::state_enum;
///
/// state_enum! {
///     enum Ball {
///         InHand,
///         Flying,
///     }
/// }
///
/// let mut log = Vec::new();
/// let mut handler = |state: &Ball, sm: &mut StateMachine<Ball>| -> Result<(), Infallible> {
///     if sm.enter_state() {
///         log.push(format!("enter {state:?}"));
///     }
///     if *state == Ball::InHand && sm.time_in_state() >= 0.5 {
///         sm.switch_state(Ball::Flying);
///     }
///     if sm.exit_state() {
///         log.push(format!("exit {state:?}"));
///     }
///     Ok(())
/// };
///
/// let mut sm = StateMachine::new(Ball::InHand);
/// sm.tick(&mut handler, 0.25).unwrap();
/// sm.tick(&mut handler, 0.25).unwrap();
/// sm.tick(&mut handler, 0.25).unwrap();
///
/// assert_eq!(sm.current_state(), &Ball::Flying);
/// assert_eq!(sm.frames_in_state(), 1);
/// assert_eq!(log, vec!["enter InHand", "exit InHand", "enter Flying"]);
/// ```
pub struct StateMachine<S: State> {
    id: u64,
    name: Option<String>,
    logging: bool,

    current: S,
    pending: Option<S>,
    replacement: Option<S>,

    enter_state: bool,
    exit_state: bool,
    executing: bool,
    ending: bool,
    ended: bool,

    delta_time: f32,
    frames_in_state: u64,
    time_in_state: f32,
    tick_count: u64,

    pub(super) pushed: bool,
    pub(super) stack: Vec<S>,

    watchdog: Watchdog,
    time_source: Box<dyn TimeSource>,
    history: TransitionLog<S>,

    exit_hooks: Vec<ExitHook<S>>,
    exit_once_hooks: Vec<ExitOnceHook<S>>,
    end_hooks: Vec<EndHook<S>>,

    misuse_count: u64,
    last_misuse: Option<Misuse>,
}

impl<S: State> StateMachine<S> {
    /// Create a machine in `initial` with the default configuration.
    ///
    /// The first tick runs `initial` with the enter flag set.
    pub fn new(initial: S) -> Self {
        Self::from_config(initial, MachineConfig::default())
    }

    /// Create a machine that logs every transition when `logging` is set.
    pub fn with_logging(initial: S, logging: bool) -> Self {
        Self::from_config(
            initial,
            MachineConfig {
                logging_enabled: logging,
                ..MachineConfig::default()
            },
        )
    }

    /// Create a machine from a configuration without validating it.
    ///
    /// Use [`StateMachineBuilder`](crate::builder::StateMachineBuilder) to
    /// reject invalid configurations up front.
    pub fn from_config(initial: S, config: MachineConfig) -> Self {
        let machine = Self {
            id: NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed),
            name: config.name,
            logging: config.logging_enabled,
            current: initial,
            pending: None,
            replacement: None,
            enter_state: true,
            exit_state: false,
            executing: false,
            ending: false,
            ended: false,
            delta_time: 0.0,
            frames_in_state: 0,
            time_in_state: 0.0,
            tick_count: 0,
            pushed: false,
            stack: Vec::new(),
            watchdog: Watchdog::new(config.watchdog_enabled, config.watchdog_limit),
            time_source: Box::new(FixedStep(config.default_delta_time)),
            history: TransitionLog::new(config.history_capacity),
            exit_hooks: Vec::new(),
            exit_once_hooks: Vec::new(),
            end_hooks: Vec::new(),
            misuse_count: 0,
            last_misuse: None,
        };

        if machine.logging {
            tracing::debug!(machine = %machine, "init");
        }
        machine
    }

    /// Run the machine for one frame that took `delta_time` seconds.
    ///
    /// Runs the current state, then every state it chains to within this
    /// tick. Afterwards the frame and time counters of whichever state is
    /// current are advanced.
    ///
    /// Ticking an ended machine is reported as [`Misuse::TickAfterEnd`] and
    /// runs nothing. A negative or non-finite `delta_time` is reported and
    /// treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::WatchdogTripped`] when the same-tick chain
    /// exceeds the watchdog limit, and [`MachineError::StateFailed`] when a
    /// state body fails. Either aborts the rest of the tick and drops any
    /// pending transition.
    pub fn tick<H: Handler<S>>(
        &mut self,
        handler: &mut H,
        delta_time: f32,
    ) -> Result<(), MachineError<H::Error>> {
        if self.ended {
            self.report(Misuse::TickAfterEnd);
            return Ok(());
        }

        let delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
            delta_time
        } else {
            self.report(Misuse::InvalidDeltaTime);
            0.0
        };

        self.tick_count += 1;
        self.executing = true;
        let result = self.run_tick(handler, delta_time);
        self.executing = false;

        if result.is_err() {
            self.pending = None;
            self.replacement = None;
        }
        result
    }

    /// Run one frame using the machine's time source for the elapsed time.
    pub fn tick_default<H: Handler<S>>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), MachineError<H::Error>> {
        let delta_time = self.time_source.delta_time();
        self.tick(handler, delta_time)
    }

    fn run_tick<H: Handler<S>>(
        &mut self,
        handler: &mut H,
        delta_time: f32,
    ) -> Result<(), MachineError<H::Error>> {
        let mut delta_time = delta_time;
        self.delta_time = delta_time;
        self.run_state(handler)?;
        self.enter_state = false;

        while !self.ending {
            let Some(next) = self.pending.take() else {
                break;
            };
            self.activate(next);
            delta_time = 0.0;
            self.delta_time = 0.0;
            self.run_state(handler)?;
            self.enter_state = false;
        }

        if self.ending {
            self.finish_end();
            return Ok(());
        }

        if let Some(replacement) = self.replacement.take() {
            self.activate(replacement);
            return Ok(());
        }

        self.frames_in_state += 1;
        self.time_in_state += delta_time;
        Ok(())
    }

    fn run_state<H: Handler<S>>(&mut self, handler: &mut H) -> Result<(), MachineError<H::Error>> {
        if let Err(trip) = self.watchdog.check(self.tick_count) {
            tracing::error!(
                machine = %self,
                runs = trip.runs,
                limit = trip.limit,
                "watchdog triggered"
            );
            return Err(MachineError::WatchdogTripped {
                machine: self.to_string(),
                state: self.state_name().to_string(),
                runs: trip.runs,
                limit: trip.limit,
            });
        }

        let state = self.current.clone();
        handler.run(&state, self).map_err(|source| {
            tracing::error!(
                machine = %self,
                state = state.name(),
                tick = self.tick_count,
                error = %source,
                "state failed"
            );
            MachineError::StateFailed {
                machine: self.to_string(),
                state: state.name().to_string(),
                tick: self.tick_count,
                source,
            }
        })
    }

    fn activate(&mut self, next: S) {
        self.current = next;
        self.enter_state = true;
        self.exit_state = false;
        self.frames_in_state = 0;
        self.time_in_state = 0.0;
    }

    /// Switch to `next` from inside a running state.
    ///
    /// The exit flag is raised immediately, so the rest of the current body
    /// runs as its exit pass; `next` runs within the same tick.
    ///
    /// Called while no state is executing, this is reported as
    /// [`Misuse::SwitchOutsideState`] and the switch is applied on the next
    /// tick.
    pub fn switch_state(&mut self, next: S) {
        if self.refuse_if_ended() {
            return;
        }
        if !self.executing {
            self.report(Misuse::SwitchOutsideState);
        }
        self.pushed = false;
        self.request_transition(next, TransitionKind::Switch);
    }

    /// Switch to `next` from outside the machine and run it before returning.
    ///
    /// Ticks the machine with zero elapsed time: the current state runs its
    /// exit pass, then `next` runs with the enter flag set.
    ///
    /// Called from inside a running state, this is reported as
    /// [`Misuse::ExternalSwitchInsideState`] and behaves like
    /// [`switch_state`](Self::switch_state).
    pub fn switch_state_external_immediate<H: Handler<S>>(
        &mut self,
        next: S,
        handler: &mut H,
    ) -> Result<(), MachineError<H::Error>> {
        if self.refuse_if_ended() {
            return Ok(());
        }
        if self.executing {
            self.report(Misuse::ExternalSwitchInsideState);
            self.pushed = false;
            self.request_transition(next, TransitionKind::Switch);
            return Ok(());
        }

        self.pushed = false;
        self.request_transition(next, TransitionKind::Switch);
        self.tick(handler, 0.0)
    }

    /// Switch to `next` from outside the machine, effective on the next tick.
    ///
    /// On that tick the current state runs its exit pass with the full
    /// elapsed time, then `next` runs with the enter flag set.
    pub fn switch_state_external_delayed(&mut self, next: S) {
        if self.refuse_if_ended() {
            return;
        }
        if self.executing {
            self.report(Misuse::ExternalSwitchInsideState);
        }
        self.pushed = false;
        self.request_transition(next, TransitionKind::Switch);
    }

    /// Force the machine into `next` without the exit protocol.
    ///
    /// No exit observers fire and per-activation exit hooks are discarded.
    /// `next` is not a pushed state, though the sub-state stack is kept.
    /// Called while a state is executing, the rest of the tick is abandoned
    /// and `next` becomes current when the tick ends, running first on the
    /// following tick. Called while idle, `next` becomes current at once.
    pub fn replace_state_without_exit(&mut self, next: S) {
        if self.refuse_if_ended() {
            return;
        }
        if self.logging {
            tracing::debug!(
                machine = %self,
                from = self.current.name(),
                to = next.name(),
                "replace without exit"
            );
        }
        self.record(TransitionKind::Replace, &next);

        self.pending = None;
        self.pushed = false;
        self.exit_once_hooks.clear();
        self.frames_in_state = 0;
        self.time_in_state = 0.0;

        if self.executing {
            self.exit_state = false;
            self.replacement = Some(next);
        } else {
            self.activate(next);
        }
    }

    /// Reports requests made after the machine ended; true if refused.
    pub(super) fn refuse_if_ended(&mut self) -> bool {
        if self.ended {
            self.report(Misuse::SwitchOnEnded);
        }
        self.ended
    }

    pub(super) fn request_transition(&mut self, next: S, kind: TransitionKind) {
        // the final pass may still request; finish_end drops the request
        if self.ending {
            self.report(Misuse::SwitchOnEnded);
        }

        if self.logging {
            tracing::debug!(
                machine = %self,
                from = self.current.name(),
                to = next.name(),
                ?kind,
                "transition"
            );
        }
        self.record(kind, &next);

        let event = ExitEvent {
            from: self.current.clone(),
            to: Some(next.clone()),
            kind,
        };
        self.pending = Some(next);
        self.exit_state = true;
        self.fire_exit(&event);
        self.frames_in_state = 0;
        self.time_in_state = 0.0;
    }

    /// End the machine from the host.
    ///
    /// Fires the exit and end observers, runs the current state one final
    /// time with the exit flag set and the enter flag cleared, then marks the
    /// machine ended. Does nothing on an ended machine. Called from inside a
    /// running state it behaves like [`end_from_state`](Self::end_from_state).
    ///
    /// The machine is ended when this returns, even if the final pass failed.
    /// An end already requested from outside a state is completed here
    /// without notifying observers again.
    pub fn end<H: Handler<S>>(&mut self, handler: &mut H) -> Result<(), MachineError<H::Error>> {
        if self.ended {
            return Ok(());
        }
        if !self.ending {
            self.begin_end();
        }
        if self.executing {
            return Ok(());
        }

        let result = self.tick(handler, 0.0);
        if !self.ended {
            self.finish_end();
        }
        result
    }

    /// End the machine from inside a running state.
    ///
    /// The rest of the running body is the final pass: the exit flag is
    /// raised, the enter flag cleared, and no further state runs this tick.
    ///
    /// Called while idle, this is reported as [`Misuse::EndOutsideState`];
    /// the final pass then happens on the next tick.
    pub fn end_from_state(&mut self) {
        if self.ended || self.ending {
            return;
        }
        if !self.executing {
            self.report(Misuse::EndOutsideState);
        }
        self.begin_end();
    }

    fn begin_end(&mut self) {
        if self.logging {
            tracing::debug!(machine = %self, "end");
        }
        let current = self.current.clone();
        self.record(TransitionKind::End, &current);

        self.ending = true;
        self.pending = None;
        self.replacement = None;
        self.enter_state = false;
        self.exit_state = true;

        let event = ExitEvent {
            from: current.clone(),
            to: None,
            kind: TransitionKind::End,
        };
        self.fire_exit(&event);
        for hook in self.end_hooks.iter_mut() {
            hook(&current);
        }
    }

    fn finish_end(&mut self) {
        self.ending = false;
        self.ended = true;
        self.pending = None;
        self.replacement = None;
        self.enter_state = false;
    }

    /// Observe every exit: each transition request and the end of the machine.
    ///
    /// Observers receive an event value only, so they cannot request
    /// transitions themselves.
    pub fn on_exit<F>(&mut self, hook: F)
    where
        F: FnMut(&ExitEvent<S>) + 'static,
    {
        self.exit_hooks.push(Box::new(hook));
    }

    /// Observe the next exit only.
    ///
    /// Typically registered by a state on its enter pass to clean up after
    /// the current activation. Discarded without firing if the state is
    /// replaced through [`replace_state_without_exit`](Self::replace_state_without_exit).
    pub fn on_exit_once<F>(&mut self, hook: F)
    where
        F: FnOnce(&ExitEvent<S>) + 'static,
    {
        self.exit_once_hooks.push(Box::new(hook));
    }

    /// Observe the end of the machine; receives the state that was current.
    pub fn on_end<F>(&mut self, hook: F)
    where
        F: FnMut(&S) + 'static,
    {
        self.end_hooks.push(Box::new(hook));
    }

    fn fire_exit(&mut self, event: &ExitEvent<S>) {
        for hook in self.exit_hooks.iter_mut() {
            hook(event);
        }
        for hook in self.exit_once_hooks.drain(..) {
            hook(event);
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Human readable name of the current state.
    pub fn state_name(&self) -> &str {
        self.current.name()
    }

    /// Is this the first run of the current state since it became current?
    pub fn enter_state(&self) -> bool {
        self.enter_state
    }

    /// Is this the last run of the current state (was a transition requested)?
    pub fn exit_state(&self) -> bool {
        self.exit_state
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Is one of this machine's states running right now?
    pub fn currently_executing(&self) -> bool {
        self.executing
    }

    /// Seconds attributed to the current run; zero for states entered
    /// mid-tick.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn frames_in_state(&self) -> u64 {
        self.frames_in_state
    }

    /// Seconds spent in the current state, not counting the current run.
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Number of ticks this machine has run, including the internal ticks
    /// of immediate switches and [`end`](Self::end).
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// True on exactly one run per activation: the one during which the time
    /// in state crosses `threshold`.
    ///
    /// ```rust
    /// use std::convert::Infallible;
    /// use tickstate::machine::StateMachine;
    /// use tickstate::state_enum;
    ///
    /// state_enum! {
    ///     enum Countdown {
    ///         Running,
    ///     }
    /// }
    ///
    /// let mut beeps = 0;
    /// let mut handler = |_: &Countdown, sm: &mut StateMachine<Countdown>| -> Result<(), Infallible> {
    ///     if sm.time_in_state_passed(1.0) {
    ///         beeps += 1;
    ///     }
    ///     Ok(())
    /// };
    ///
    /// let mut sm = StateMachine::new(Countdown::Running);
    /// for _ in 0..10 {
    ///     sm.tick(&mut handler, 0.3).unwrap();
    /// }
    /// assert_eq!(beeps, 1);
    /// ```
    pub fn time_in_state_passed(&self, threshold: f32) -> bool {
        threshold >= self.time_in_state && threshold < self.time_in_state + self.delta_time
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    pub fn set_logging(&mut self, logging: bool) {
        self.logging = logging;
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn set_watchdog_enabled(&mut self, enabled: bool) {
        self.watchdog.set_enabled(enabled);
    }

    pub fn set_watchdog_limit(&mut self, limit: u32) {
        self.watchdog.set_limit(limit);
    }

    /// Replace the source consulted by [`tick_default`](Self::tick_default).
    pub fn set_time_source<T>(&mut self, source: T)
    where
        T: TimeSource + 'static,
    {
        self.time_source = Box::new(source);
    }

    pub(crate) fn set_boxed_time_source(&mut self, source: Box<dyn TimeSource>) {
        self.time_source = source;
    }

    pub fn history(&self) -> &TransitionLog<S> {
        &self.history
    }

    /// Number of misuses reported since the machine was created.
    pub fn misuse_count(&self) -> u64 {
        self.misuse_count
    }

    pub fn last_misuse(&self) -> Option<Misuse> {
        self.last_misuse
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            id: self.id,
            label: self.to_string(),
            state: self.state_name().to_string(),
            enter_state: self.enter_state,
            exit_state: self.exit_state,
            ended: self.ended,
            currently_executing: self.executing,
            delta_time: self.delta_time,
            frames_in_state: self.frames_in_state,
            time_in_state: self.time_in_state,
            is_pushed_state: self.pushed,
            sub_state_depth: self.stack.len(),
            tick_count: self.tick_count,
            misuse_count: self.misuse_count,
        }
    }

    pub(super) fn report(&mut self, misuse: Misuse) {
        tracing::warn!(machine = %self, "{misuse}");
        self.misuse_count += 1;
        self.last_misuse = Some(misuse);
    }

    fn record(&mut self, kind: TransitionKind, to: &S) {
        if self.history.capacity() == 0 {
            return;
        }
        self.history.record(TransitionRecord {
            from: self.current.clone(),
            to: to.clone(),
            kind,
            tick: self.tick_count,
            at: Utc::now(),
        });
    }
}

impl<S: State> fmt::Display for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}#{} {} +{}]",
            self.name.as_deref().unwrap_or("StateMachine"),
            self.id,
            self.current.name(),
            self.stack.len()
        )
    }
}

impl<S: State> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("pending", &self.pending)
            .field("enter_state", &self.enter_state)
            .field("exit_state", &self.exit_state)
            .field("ended", &self.ended)
            .field("frames_in_state", &self.frames_in_state)
            .field("time_in_state", &self.time_in_state)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}
