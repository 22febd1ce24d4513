//! Output rendering module
//!
//! Turns session snapshots into lines for the terminal front-end.

pub mod status;

// Re-export main types
pub use status::{OutputFormat, StatusLine};
