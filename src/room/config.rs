//! Room shell configuration.

use serde::{Deserialize, Serialize};

use crate::game::constants::DEFAULT_TIME_PER_ROUND_SECS;

/// Configuration for one room's shell.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomConfig {
    /// Seconds a seat may sit on its turn (and the table on a run-out
    /// vote) before the fallback fires.
    pub time_per_round_secs: u16,

    /// Capacity of the room's command inbox.
    pub inbox_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            time_per_round_secs: DEFAULT_TIME_PER_ROUND_SECS,
            inbox_capacity: 64,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.time_per_round_secs == 0 {
            return Err("time per round must be at least 1 second".to_string());
        }
        if self.inbox_capacity == 0 {
            return Err("inbox capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
