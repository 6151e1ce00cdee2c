//! Elapsed-time sources for hosts that do not pass a delta explicitly.

use std::time::Instant;

/// Default step of [`FixedStep`]: one frame at 60 Hz.
pub const DEFAULT_DELTA_TIME: f32 = 1.0 / 60.0;

/// Supplies the elapsed time, in seconds, for the next tick.
pub trait TimeSource {
    fn delta_time(&mut self) -> f32;
}

/// Reports the same step on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep(pub f32);

impl Default for FixedStep {
    fn default() -> Self {
        Self(DEFAULT_DELTA_TIME)
    }
}

impl TimeSource for FixedStep {
    fn delta_time(&mut self) -> f32 {
        self.0
    }
}

/// Measures real time between consecutive samples.
///
/// The first sample is zero, since there is no previous frame to measure
/// against.
#[derive(Debug, Clone, Default)]
pub struct WallClock {
    last: Option<Instant>,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for WallClock {
    fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        elapsed
    }
}

impl<F> TimeSource for F
where
    F: FnMut() -> f32,
{
    fn delta_time(&mut self) -> f32 {
        self()
    }
}
