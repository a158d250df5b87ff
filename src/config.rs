//! Schedule configuration

use serde::{Deserialize, Serialize};

/// Tunables for a [`crate::schedule::Schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minutes between a flight's arrival and its derived return departure
    pub turnaround: u64,

    /// Flight minutes per aircraft per day before it counts as overworked
    pub max_daily_flight_time: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            turnaround: 0,
            max_daily_flight_time: 12 * 60,
        }
    }
}
