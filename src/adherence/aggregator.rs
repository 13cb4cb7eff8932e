//! Per-day adherence aggregation.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{IntakeLog, IntakeStatus, Medication};

/// One day in an adherence series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceDay {
    pub date: NaiveDate,
    /// Display label: weekday name for windows of up to a week,
    /// month and day otherwise.
    pub day: String,
    pub taken: u32,
    pub scheduled: u32,
}

/// Rolls up scheduled and taken counts for each of the `window_days`
/// days ending at `reference_date`, oldest first.
///
/// The scheduled count sums the schedule times of every medication
/// eligible on that weekday. The taken count is the number of taken
/// logs whose local calendar date matches, with no regard to which
/// medication or hour they belong to. Days without activity still
/// appear, zeroed.
pub fn aggregate_adherence(
    medications: &[Medication],
    logs: &[IntakeLog],
    window_days: u32,
    reference_date: NaiveDate,
    tz: FixedOffset,
) -> Vec<AdherenceDay> {
    let mut series = Vec::with_capacity(window_days as usize);
    for back in (0..window_days).rev() {
        let date = reference_date - Duration::days(i64::from(back));
        let weekday = date.weekday().num_days_from_sunday() as u8;

        let scheduled: u32 = medications
            .iter()
            .filter(|m| m.schedule.applies_on(weekday))
            .map(|m| m.schedule.times.len() as u32)
            .sum();

        let taken = logs
            .iter()
            .filter(|log| {
                log.status == IntakeStatus::Taken
                    && log.time.with_timezone(&tz).date_naive() == date
            })
            .count() as u32;

        series.push(AdherenceDay {
            date,
            day: day_label(date, window_days),
            taken,
            scheduled,
        });
    }
    series
}

fn day_label(date: NaiveDate, window_days: u32) -> String {
    if window_days <= 7 {
        date.format("%a").to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
