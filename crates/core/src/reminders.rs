//! Departure reminder rules.
//!
//! Reminders come in two kinds: `standard` ones that the scheduler creates
//! on its own at fixed offsets before departure, and `custom` ones a
//! passenger sets per ticket. The scheduler configuration and the bounds on
//! custom offsets are defined here; the scan itself lives in the database
//! layer and the background task.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Reminder kind
// ---------------------------------------------------------------------------

/// Origin of a reminder row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Created by the scheduler at the configured offsets.
    Standard,
    /// Created by the passenger; at most one per ticket.
    Custom,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Standard => "standard",
            ReminderKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(ReminderKind::Standard),
            "custom" => Ok(ReminderKind::Custom),
            other => Err(CoreError::Validation(format!(
                "unknown reminder kind: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler configuration
// ---------------------------------------------------------------------------

/// How often the scheduler wakes up.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

/// How far ahead of now flights are considered when materializing
/// standard reminders. Must cover the largest standard offset.
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 26;

/// Offsets (hours before departure) at which standard reminders fire.
pub const DEFAULT_STANDARD_OFFSETS_HOURS: [i64; 2] = [24, 2];

/// Maximum number of due reminders delivered in one scheduler cycle.
/// Anything beyond the cap waits for the next cycle.
pub const DEFAULT_FIRE_BATCH_LIMIT: i64 = 200;

/// Tunables for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub scan_interval_secs: u64,
    pub lookahead_hours: i64,
    pub standard_offsets_hours: Vec<i64>,
    pub fire_batch_limit: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            lookahead_hours: DEFAULT_LOOKAHEAD_HOURS,
            standard_offsets_hours: DEFAULT_STANDARD_OFFSETS_HOURS.to_vec(),
            fire_batch_limit: DEFAULT_FIRE_BATCH_LIMIT,
        }
    }
}

/// Parse a comma-separated offsets list (e.g. `"24,2"`) into hours.
pub fn parse_standard_offsets(raw: &str) -> Result<Vec<i64>, CoreError> {
    let mut offsets = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let hours: i64 = part.parse().map_err(|_| {
            CoreError::Validation(format!("invalid reminder offset: {part}"))
        })?;
        if hours <= 0 {
            return Err(CoreError::Validation(format!(
                "reminder offsets must be positive, got {hours}"
            )));
        }
        offsets.push(hours);
    }
    if offsets.is_empty() {
        return Err(CoreError::Validation(
            "at least one reminder offset is required".to_string(),
        ));
    }
    Ok(offsets)
}

// ---------------------------------------------------------------------------
// Custom reminder bounds
// ---------------------------------------------------------------------------

/// Smallest allowed custom offset in hours before departure.
pub const MIN_CUSTOM_HOURS: i64 = 1;

/// Largest allowed custom offset in hours before departure (ten days).
pub const MAX_CUSTOM_HOURS: i64 = 240;

/// Validate a passenger-chosen reminder offset.
pub fn validate_custom_hours(hours: i64) -> Result<(), CoreError> {
    if !(MIN_CUSTOM_HOURS..=MAX_CUSTOM_HOURS).contains(&hours) {
        return Err(CoreError::Validation(format!(
            "hours_before must be between {MIN_CUSTOM_HOURS} and {MAX_CUSTOM_HOURS}, got {hours}"
        )));
    }
    Ok(())
}

/// The instant a reminder with the given offset should fire.
pub fn fire_time(departure: Timestamp, hours_before: i64) -> Timestamp {
    departure - Duration::hours(hours_before)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
