//! Configuration checks, accumulated rather than fail-fast.

use super::MachineConfig;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Problems found in a [`MachineConfig`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("default_delta_time must be finite and non-negative (got {0})")]
    InvalidDeltaTime(f32),

    #[error("watchdog is enabled with a zero limit, which never trips")]
    ZeroWatchdogLimit,

    #[error("machine name must not be empty")]
    EmptyName,
}

impl MachineConfig {
    /// Check every rule and report ALL problems found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let checks = vec![
            check_delta_time(self.default_delta_time),
            check_watchdog(self.watchdog_enabled, self.watchdog_limit),
            check_name(self.name.as_deref()),
        ];

        Validation::all_vec(checks).map(|_| ())
    }
}

fn check_delta_time(delta_time: f32) -> Validation<(), NonEmptyVec<ConfigError>> {
    if delta_time.is_finite() && delta_time >= 0.0 {
        Validation::success(())
    } else {
        Validation::fail(ConfigError::InvalidDeltaTime(delta_time))
    }
}

fn check_watchdog(enabled: bool, limit: u32) -> Validation<(), NonEmptyVec<ConfigError>> {
    if enabled && limit == 0 {
        Validation::fail(ConfigError::ZeroWatchdogLimit)
    } else {
        Validation::success(())
    }
}

fn check_name(name: Option<&str>) -> Validation<(), NonEmptyVec<ConfigError>> {
    match name {
        Some(name) if name.trim().is_empty() => Validation::fail(ConfigError::EmptyName),
        _ => Validation::success(()),
    }
}
