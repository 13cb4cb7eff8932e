//! Medication records: recurrence schedule and refill supply for one
//! prescription, owner-scoped.
//!
//! Boundary validation lives here: repository and reconciliation code
//! assume well-formed schedules (HH:MM times, weekday indices 0-6,
//! non-negative quantities).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Frequency;
use crate::db::DatabaseError;

/// 24h clock times "00:00" through "23:59".
static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap());

/// Whether `value` is a well-formed "HH:MM" time of day.
pub(crate) fn is_time_of_day(value: &str) -> bool {
    TIME_OF_DAY.is_match(value)
}

/// A medication with its recurrence schedule and refill state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub schedule: Schedule,
    pub refill: Refill,
}

/// Recurrence rule: which days a medication is due, at which times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub frequency: Frequency,
    /// Times of day as "HH:MM". Set semantics, duplicates carry no meaning.
    pub times: Vec<String>,
    /// Weekday indices 0-6 (0 = Sunday), consulted for weekly/custom.
    /// Absent means no day is scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
}

/// Remaining supply and the level at or below which a refill is due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refill {
    pub quantity: i64,
    pub reminder_threshold: i64,
}

/// Client-supplied medication fields; the id is assigned at insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub schedule: Schedule,
    pub refill: Refill,
}

impl Schedule {
    /// Rejects empty `times`, entries not matching HH:MM, and weekday
    /// indices outside 0-6. Malformed schedules must never reach the
    /// reconciliation core.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.times.is_empty() {
            return Err(DatabaseError::Validation(
                "schedule.times must not be empty".into(),
            ));
        }
        for t in &self.times {
            if !is_time_of_day(t) {
                return Err(DatabaseError::Validation(format!(
                    "invalid time of day {t:?}, expected HH:MM"
                )));
            }
        }
        if let Some(days) = &self.days {
            for d in days {
                if *d > 6 {
                    return Err(DatabaseError::Validation(format!(
                        "invalid weekday index {d}, expected 0-6"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether this schedule produces doses on the given local weekday
    /// (0 = Sunday .. 6 = Saturday). Daily applies every day;
    /// weekly/custom only on listed days, never when `days` is absent.
    pub fn applies_on(&self, weekday: u8) -> bool {
        match self.frequency {
            Frequency::Daily => true,
            Frequency::Weekly | Frequency::Custom => self
                .days
                .as_ref()
                .is_some_and(|days| days.contains(&weekday)),
        }
    }
}

impl Refill {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.quantity < 0 {
            return Err(DatabaseError::Validation(
                "refill.quantity must be non-negative".into(),
            ));
        }
        if self.reminder_threshold < 0 {
            return Err(DatabaseError::Validation(
                "refill.reminderThreshold must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Refill alert predicate: supply at or below the reminder threshold.
    pub fn needs_refill(&self) -> bool {
        self.quantity <= self.reminder_threshold
    }
}

impl NewMedication {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.name.trim().is_empty() {
            return Err(DatabaseError::Validation(
                "name must not be empty".into(),
            ));
        }
        self.schedule.validate()?;
        self.refill.validate()
    }
}
