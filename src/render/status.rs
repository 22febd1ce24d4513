//! Status line rendering for session snapshots

use serde::Serialize;

use crate::{format::ClockTime, state::SessionSnapshot};

/// How snapshots are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One rendered snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StatusLine<'a> {
    pub clock: String,
    #[serde(flatten)]
    pub snapshot: &'a SessionSnapshot,
}

impl<'a> StatusLine<'a> {
    pub fn new(snapshot: &'a SessionSnapshot) -> Self {
        Self {
            clock: ClockTime::from_seconds(snapshot.remaining_seconds).to_string(),
            snapshot,
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String, String> {
        match format {
            OutputFormat::Text => Ok(self.text()),
            OutputFormat::Json => serde_json::to_string(self)
                .map_err(|e| format!("Failed to serialize snapshot: {}", e)),
        }
    }

    /// `HH:MM:SS  NNN%  state`
    pub fn text(&self) -> String {
        format!(
            "{}  {:>3}%  {}",
            self.clock, self.snapshot.progress_percent, self.snapshot.state
        )
    }
}
