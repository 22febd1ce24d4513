//! Countdown - a countdown timer controller
//!
//! This library provides the countdown state machine (stopped, running,
//! paused), the per-second tick that drives it, and the fixed-width period
//! formatting used to display and edit durations.

pub mod config;
pub mod format;
pub mod render;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use format::{ClockField, ClockTime, Period};
pub use state::{ControllerConfig, CountdownController, SessionSnapshot, StateChange, TimerState};
pub use tasks::{TimerService, TokioTimerService};
