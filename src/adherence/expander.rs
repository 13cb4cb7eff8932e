//! Schedule expansion: recurrence rules to concrete dose instants.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::models::Medication;

/// One expected intake event on a specific local day at a specific
/// time of day.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledDose {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    /// Time of day as stored on the schedule ("HH:MM").
    pub time_of_day: String,
    /// Local calendar instant: day plus time of day.
    pub at: NaiveDateTime,
}

/// Expands a medication's schedule over an inclusive local date range.
///
/// Emits one dose per eligible day per schedule time, ordered by day
/// ascending then time-of-day ascending. Daily schedules are eligible
/// every day; weekly and custom schedules only on the weekdays listed
/// in `days` (0 = Sunday), and never when `days` is absent. An empty
/// or inverted range yields nothing. Duplicate schedule times collapse
/// into one dose per slot.
pub fn expand_schedule(medication: &Medication, start: NaiveDate, end: NaiveDate) -> Vec<ScheduledDose> {
    let mut times: Vec<&str> = medication.schedule.times.iter().map(String::as_str).collect();
    times.sort_unstable();
    times.dedup();

    let mut doses = Vec::new();
    let mut day = start;
    while day <= end {
        let weekday = day.weekday().num_days_from_sunday() as u8;
        if medication.schedule.applies_on(weekday) {
            for time in &times {
                if let Ok(tod) = NaiveTime::parse_from_str(time, "%H:%M") {
                    doses.push(ScheduledDose {
                        medication_id: medication.id,
                        medication_name: medication.name.clone(),
                        dosage: medication.dosage.clone(),
                        time_of_day: (*time).to_string(),
                        at: day.and_time(tod),
                    });
                }
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    doses
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
