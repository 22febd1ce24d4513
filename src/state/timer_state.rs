//! Timer run state

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Run state of the countdown; exactly one is current at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl TimerState {
    /// Check if the countdown is ticking
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running)
    }

    /// Check if the countdown is idle with no session
    pub fn is_stopped(&self) -> bool {
        matches!(self, TimerState::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stopped" => Ok(TimerState::Stopped),
            "running" => Ok(TimerState::Running),
            "paused" => Ok(TimerState::Paused),
            other => Err(format!("Unknown timer state: {}", other)),
        }
    }
}
