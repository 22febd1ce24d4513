//! Countdown session structure and its guarded mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimerState;

/// The countdown's mutable data, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountdownSession {
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub progress_percent: u8,
    pub state: TimerState,
}

impl CountdownSession {
    /// Create an empty, stopped session
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a new duration; ignored unless stopped
    pub fn set_duration(&mut self, total_seconds: u64) -> bool {
        if !self.state.is_stopped() {
            return false;
        }
        self.total_seconds = total_seconds;
        self.remaining_seconds = total_seconds;
        self.progress_percent = if total_seconds > 0 { 100 } else { 0 };
        true
    }

    /// Decide whether moving to `target` applies
    pub fn can_enter(&self, target: TimerState) -> bool {
        if target == self.state {
            return false;
        }
        match target {
            TimerState::Running | TimerState::Paused => self.remaining_seconds > 0,
            TimerState::Stopped => true,
        }
    }

    /// Zero every field and return to stopped
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// One tick: decrement the remaining time and recompute progress.
    ///
    /// Returns the remaining seconds after the tick.
    pub fn tick(&mut self) -> u64 {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.progress_percent = progress(self.remaining_seconds, self.total_seconds);
        self.remaining_seconds
    }

    /// Point-in-time copy for observers
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            progress_percent: self.progress_percent,
            updated_at: Utc::now(),
        }
    }
}

/// `remaining * 100 / total`, or 0 for an empty session
pub fn progress(remaining_seconds: u64, total_seconds: u64) -> u8 {
    if total_seconds == 0 {
        return 0;
    }
    let remaining = u128::from(remaining_seconds.min(total_seconds));
    (remaining * 100 / u128::from(total_seconds)) as u8
}

/// Observable copy of the session published after every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: TimerState,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub progress_percent: u8,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        CountdownSession::new().snapshot()
    }
}

/// A state transition that was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: TimerState,
    pub to: TimerState,
}
