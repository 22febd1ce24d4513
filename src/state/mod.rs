//! State management module
//!
//! This module contains the countdown session, its run state, and the
//! controller that owns them.

pub mod timer_state;
pub mod session;
pub mod controller;

// Re-export main types
pub use timer_state::TimerState;
pub use session::{CountdownSession, SessionSnapshot, StateChange};
pub use controller::{ControllerConfig, CountdownController};
