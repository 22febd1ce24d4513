//! Utility functions module
//!
//! This module contains utility functions used by the terminal front-end.

pub mod commands;
pub mod signals;

// Re-export main items
pub use commands::Command;
pub use signals::shutdown_signal;
