//! Hour-bucket index over taken intake logs.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, Timelike};
use uuid::Uuid;

use crate::models::{IntakeLog, IntakeStatus};

/// Answers "was a taken dose recorded for this medication during this
/// local calendar hour?".
///
/// Only logs with status `taken` are indexed; missed and skipped
/// entries never satisfy a scheduled dose. Duplicate logs in the same
/// hour collapse into one bucket, so rapid re-logging cannot satisfy
/// two scheduled slots.
#[derive(Debug)]
pub struct IntakeIndex {
    taken: HashSet<(Uuid, NaiveDate, u32)>,
}

impl IntakeIndex {
    /// Builds the index, converting each log instant to the given
    /// local offset before reading its calendar date and hour.
    pub fn build(logs: &[IntakeLog], tz: FixedOffset) -> Self {
        let mut taken = HashSet::new();
        for log in logs {
            if log.status != IntakeStatus::Taken {
                continue;
            }
            let local = log.time.with_timezone(&tz);
            taken.insert((log.medication_id, local.date_naive(), local.hour()));
        }
        Self { taken }
    }

    pub fn was_taken(&self, medication_id: Uuid, date: NaiveDate, hour: u32) -> bool {
        self.taken.contains(&(medication_id, date, hour))
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
