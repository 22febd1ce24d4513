//! Display formatting module
//!
//! Fixed-width period fields and the clock decomposition built on them.

pub mod period;
pub mod clock;

// Re-export main types
pub use period::Period;
pub use clock::{preset_label, preset_seconds, quick_presets, ClockField, ClockTime};
