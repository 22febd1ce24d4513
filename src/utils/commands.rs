//! Line commands read from stdin by the terminal front-end

use std::str::FromStr;

use crate::{
    format::{ClockField, ClockTime},
    state::TimerState,
};

/// A parsed control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request a state transition
    State(TimerState),
    /// Replace the configured duration
    Set(ClockTime),
    /// Type into one clock field
    Entry(ClockField, String),
    /// Use one of the quick-select presets (1-based)
    Preset(usize),
    /// Print the current snapshot
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| "Empty command".to_string())?
            .to_lowercase();
        let arg = words.next();

        let field = |field: ClockField| {
            arg.map(|text| Command::Entry(field, text.to_string()))
                .ok_or_else(|| format!("'{}' needs a value", verb))
        };

        match verb.as_str() {
            "set" => arg
                .ok_or_else(|| "'set' needs a duration".to_string())?
                .parse()
                .map(Command::Set),
            "hours" | "h" => field(ClockField::Hours),
            "minutes" | "m" => field(ClockField::Minutes),
            "seconds" | "s" => field(ClockField::Seconds),
            "preset" => arg
                .ok_or_else(|| "'preset' needs a number".to_string())?
                .parse()
                .map(Command::Preset)
                .map_err(|e| format!("Invalid preset number: {}", e)),
            "status" => Ok(Command::Status),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "start" | "run" | "resume" => Ok(Command::State(TimerState::Running)),
            "pause" => Ok(Command::State(TimerState::Paused)),
            "stop" => Ok(Command::State(TimerState::Stopped)),
            other => other
                .parse()
                .map(Command::State)
                .map_err(|_| format!("Unknown command: {}", other)),
        }
    }
}
