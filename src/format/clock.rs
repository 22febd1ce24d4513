//! Hours/minutes/seconds decomposition of a duration

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Period;

/// Number of quick-select presets
pub const PRESET_COUNT: u64 = 10;
/// Spacing between quick-select presets, in seconds
pub const PRESET_STEP_SECONDS: u64 = 30;

/// One editable field of a [`ClockTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockField {
    Hours,
    Minutes,
    Seconds,
}

impl ClockField {
    /// Display period used for this field
    pub fn period(&self) -> Period {
        match self {
            ClockField::Hours => Period::HOURS,
            ClockField::Minutes => Period::MINUTES,
            ClockField::Seconds => Period::SECONDS,
        }
    }
}

/// A duration split into clock fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ClockTime {
    /// Split a total number of seconds
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Recombine into a total number of seconds
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Total after replacing the hours field
    pub fn with_hours(&self, hours: u64) -> u64 {
        Self { hours, ..*self }.total_seconds()
    }

    /// Total after replacing the minutes field
    pub fn with_minutes(&self, minutes: u64) -> u64 {
        Self { minutes, ..*self }.total_seconds()
    }

    /// Total after replacing the seconds field
    pub fn with_seconds(&self, seconds: u64) -> u64 {
        Self { seconds, ..*self }.total_seconds()
    }

    /// Total after typing `text` into `field`, with the period's roll-over policy
    pub fn apply_entry(&self, field: ClockField, text: &str) -> u64 {
        let value = u64::from(field.period().parse_entry(text));
        match field {
            ClockField::Hours => self.with_hours(value),
            ClockField::Minutes => self.with_minutes(value),
            ClockField::Seconds => self.with_seconds(value),
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            Period::HOURS.format(clamp_u32(self.hours)),
            Period::MINUTES.format(clamp_u32(self.minutes)),
            Period::SECONDS.format(clamp_u32(self.seconds)),
        )
    }
}

impl FromStr for ClockTime {
    type Err = String;

    /// Accepts `SS`, `MM:SS` or `HH:MM:SS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split(':')
            .map(|part| {
                part.trim()
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid clock field '{}': {}", part, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = match parts.as_slice() {
            [s] => *s,
            [m, s] => m.saturating_mul(60).saturating_add(*s),
            [h, m, s] => h
                .saturating_mul(3600)
                .saturating_add(m.saturating_mul(60))
                .saturating_add(*s),
            _ => return Err(format!("Expected SS, MM:SS or HH:MM:SS, got '{}'", s)),
        };
        Ok(Self::from_seconds(total))
    }
}

/// Quick-select durations: 30s, 60s, ... 300s
pub fn quick_presets() -> Vec<u64> {
    (1..=PRESET_COUNT).map(|k| k * PRESET_STEP_SECONDS).collect()
}

/// Duration of the 1-based preset `number`, if there is one
pub fn preset_seconds(number: usize) -> Option<u64> {
    number
        .checked_sub(1)
        .and_then(|index| quick_presets().get(index).copied())
}

/// `MM:SS` label for a preset
pub fn preset_label(seconds: u64) -> String {
    format!(
        "{}:{}",
        Period::MINUTES.format(clamp_u32(seconds / 60)),
        Period::SECONDS.format(clamp_u32(seconds % 60)),
    )
}

// Anything past u32::MAX is out of every period anyway
fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
