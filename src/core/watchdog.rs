//! Runaway guard for same-tick transition chains.
//!
//! A state that switches to itself (or ping-pongs between two states)
//! unconditionally would keep a tick looping forever. The watchdog counts
//! state invocations per tick and trips once the count passes its limit.

/// Default number of state invocations allowed within one tick.
pub const DEFAULT_WATCHDOG_LIMIT: u32 = 100;

/// Reported when a single tick invoked states more often than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogTrip {
    /// Invocations counted in the offending tick, including the refused one.
    pub runs: u32,
    /// Limit in force when the watchdog tripped.
    pub limit: u32,
}

/// Per-tick invocation counter.
///
/// The counter resets whenever [`check`](Self::check) observes a tick index
/// different from the previous call. A limit of zero never trips.
///
/// # Example
///
/// ```rust
/// use tickstate::core::Watchdog;
///
/// let mut watchdog = Watchdog::new(true, 2);
///
/// assert!(watchdog.check(1).is_ok());
/// assert!(watchdog.check(1).is_ok());
/// assert!(watchdog.check(1).is_err());
///
/// // a new tick starts a fresh count
/// assert!(watchdog.check(2).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Watchdog {
    enabled: bool,
    limit: u32,
    runs_this_tick: u32,
    last_tick: Option<u64>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(true, DEFAULT_WATCHDOG_LIMIT)
    }
}

impl Watchdog {
    pub fn new(enabled: bool, limit: u32) -> Self {
        Self {
            enabled,
            limit,
            runs_this_tick: 0,
            last_tick: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Invocations counted so far in the most recently observed tick.
    pub fn runs_this_tick(&self) -> u32 {
        self.runs_this_tick
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Count one state invocation in `tick`.
    ///
    /// Must be called immediately before every invocation. Returns an error
    /// once the invocation count for this tick exceeds the limit.
    pub fn check(&mut self, tick: u64) -> Result<(), WatchdogTrip> {
        if !self.enabled {
            return Ok(());
        }

        if self.last_tick != Some(tick) {
            self.last_tick = Some(tick);
            self.runs_this_tick = 0;
        }

        self.runs_this_tick = self.runs_this_tick.saturating_add(1);
        if self.limit > 0 && self.runs_this_tick > self.limit {
            return Err(WatchdogTrip {
                runs: self.runs_this_tick,
                limit: self.limit,
            });
        }
        Ok(())
    }
}
