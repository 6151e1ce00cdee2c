//! Per-machine configuration.
//!
//! Every field has a default, so a host can deserialize a partial document
//! and only override what it cares about.
//!
//! # Example
//!
//! ```rust
//! use tickstate::config::MachineConfig;
//!
//! let config = MachineConfig::from_json(r#"{ "watchdog_limit": 5 }"#).unwrap();
//!
//! assert_eq!(config.watchdog_limit, 5);
//! assert!(config.watchdog_enabled);
//! assert!(!config.logging_enabled);
//! ```

mod validation;

pub use validation::ConfigError;

use crate::core::{DEFAULT_DELTA_TIME, DEFAULT_WATCHDOG_LIMIT};
use serde::{Deserialize, Serialize};

/// Default number of transitions kept in a machine's transition log.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Configuration for one state machine instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Replaces the `StateMachine` prefix in the machine's display label.
    pub name: Option<String>,

    /// Emit a debug event on every transition, push and pop.
    /// Misuse warnings are emitted regardless.
    pub logging_enabled: bool,

    pub watchdog_enabled: bool,

    /// State invocations allowed within one tick before the watchdog trips.
    pub watchdog_limit: u32,

    /// Step reported by the default time source, in seconds.
    pub default_delta_time: f32,

    /// Transitions retained in the transition log; 0 disables it.
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: None,
            logging_enabled: false,
            watchdog_enabled: true,
            watchdog_limit: DEFAULT_WATCHDOG_LIMIT,
            default_delta_time: DEFAULT_DELTA_TIME,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MachineConfig {
    /// Parse a configuration document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
