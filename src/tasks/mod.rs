//! Timer tasks module
//!
//! This module contains the schedulable timers that drive the countdown.

pub mod timer_service;

// Re-export main types
pub use timer_service::{MIN_PERIOD, Repeat, TimerHandle, TimerService, TokioTimerHandle, TokioTimerService};
