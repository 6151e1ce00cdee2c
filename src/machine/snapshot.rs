//! Serializable view of a machine for diagnostics and UI.

use serde::{Deserialize, Serialize};

/// The read-only properties of a machine at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub id: u64,
    /// Display label, e.g. `[StateMachine#3 Flying +0]`
    pub label: String,
    /// Name of the current state
    pub state: String,
    pub enter_state: bool,
    pub exit_state: bool,
    pub ended: bool,
    pub currently_executing: bool,
    pub delta_time: f32,
    pub frames_in_state: u64,
    pub time_in_state: f32,
    pub is_pushed_state: bool,
    pub sub_state_depth: usize,
    pub tick_count: u64,
    pub misuse_count: u64,
}
