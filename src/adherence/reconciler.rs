//! Dose reconciliation: classifying scheduled doses against logs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adherence::{expand_schedule, IntakeIndex};
use crate::models::{IntakeLog, Medication};

/// Upper bound on reported missed doses; the most recent are kept.
pub const MISSED_DOSE_CAP: usize = 50;

/// A scheduled dose with no matching taken log whose time has passed.
///
/// The id is synthesized from the medication, local date, and time of
/// day, so reconciling the same inputs always yields the same ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedDose {
    pub id: String,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    /// Local calendar instant of the scheduled dose.
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub refill_reminders: Vec<Medication>,
    pub missed_doses: Vec<MissedDose>,
}

/// Reconciles scheduled doses against intake logs over an inclusive
/// local date window.
///
/// A dose is satisfied when a taken log exists for the same
/// medication in the same local calendar hour. Unsatisfied doses on
/// days before today are missed; today's are missed once their HH:MM
/// is at or before the current local HH:MM and pending otherwise;
/// future days are never reported. Pending and future doses are
/// excluded entirely, not labelled. Missed doses are sorted most
/// recent first and capped at [`MISSED_DOSE_CAP`].
///
/// Refill reminders list every medication whose remaining quantity is
/// at or below its reminder threshold, independent of the window.
pub fn reconcile(
    medications: &[Medication],
    logs: &[IntakeLog],
    window_start: NaiveDate,
    window_end: NaiveDate,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> ReconcileReport {
    let refill_reminders: Vec<Medication> = medications
        .iter()
        .filter(|m| m.refill.needs_refill())
        .cloned()
        .collect();

    let index = IntakeIndex::build(logs, tz);
    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();
    let now_hhmm = local_now.hour() * 100 + local_now.minute();

    let mut missed_doses = Vec::new();
    for medication in medications {
        for dose in expand_schedule(medication, window_start, window_end) {
            let dose_date = dose.at.date();
            if index.was_taken(dose.medication_id, dose_date, dose.at.hour()) {
                continue;
            }
            let is_missed = if dose_date < today {
                true
            } else if dose_date == today {
                dose.at.hour() * 100 + dose.at.minute() <= now_hhmm
            } else {
                false
            };
            if is_missed {
                missed_doses.push(MissedDose {
                    id: format!("{}|{}|{}", dose.medication_id, dose_date, dose.time_of_day),
                    medication_id: dose.medication_id,
                    medication_name: dose.medication_name,
                    dosage: dose.dosage,
                    time: dose.at,
                });
            }
        }
    }

    missed_doses.sort_by(|a, b| b.time.cmp(&a.time));
    missed_doses.truncate(MISSED_DOSE_CAP);

    ReconcileReport {
        refill_reminders,
        missed_doses,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, IntakeStatus, Refill, Schedule};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn med(name: &str, times: &[&str], quantity: i64, threshold: i64) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: name.to_string(),
            dosage: "10mg".to_string(),
            schedule: Schedule {
                frequency: Frequency::Daily,
                times: times.iter().map(|t| t.to_string()).collect(),
                days: None,
            },
            refill: Refill {
                quantity,
                reminder_threshold: threshold,
            },
        }
    }

    fn taken(medication_id: Uuid, time: &str) -> IntakeLog {
        IntakeLog {
            id: Uuid::new_v4(),
            medication_id,
            medication_name: "x".to_string(),
            dosage: "x".to_string(),
            time: time.parse::<DateTime<Utc>>().unwrap(),
            status: IntakeStatus::Taken,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(time: &str) -> DateTime<Utc> {
        time.parse::<DateTime<Utc>>().unwrap()
    }

    #[test]
    fn taken_log_in_same_hour_satisfies_dose() {
        let m = med("Aspirin", &["08:00"], 30, 5);
        let logs = vec![taken(m.id, "2024-01-01T08:47:00Z")];
        let report = reconcile(
            &[m],
            &logs,
            date(2024, 1, 1),
            date(2024, 1, 1),
            at("2024-01-02T12:00:00Z"),
            utc(),
        );

        assert!(report.missed_doses.is_empty());
    }

    #[test]
    fn taken_log_in_wrong_hour_does_not_satisfy() {
        let m = med("Aspirin", &["08:00"], 30, 5);
        let logs = vec![taken(m.id, "2024-01-01T09:30:00Z")];
        let report = reconcile(
            &[m],
            &logs,
            date(2024, 1, 1),
            date(2024, 1, 1),
            at("2024-01-02T12:00:00Z"),
            utc(),
        );

        assert_eq!(report.missed_doses.len(), 1);
    }

    #[test]
    fn days_before_today_are_missed_regardless_of_time() {
        let m = med("Aspirin", &["23:00"], 30, 5);
        let report = reconcile(
            &[m],
            &[],
            date(2024, 1, 1),
            date(2024, 1, 1),
            at("2024-01-02T00:05:00Z"),
            utc(),
        );

        assert_eq!(report.missed_doses.len(), 1);
    }

    #[test]
    fn todays_dose_is_pending_until_its_minute_arrives() {
        let m = med("Aspirin", &["08:00"], 30, 5);

        let before = reconcile(
            &[m.clone()],
            &[],
            date(2024, 1, 2),
            date(2024, 1, 2),
            at("2024-01-02T07:59:00Z"),
            utc(),
        );
        assert!(before.missed_doses.is_empty());

        // Equality counts as passed.
        let exact = reconcile(
            &[m],
            &[],
            date(2024, 1, 2),
            date(2024, 1, 2),
            at("2024-01-02T08:00:00Z"),
            utc(),
        );
        assert_eq!(exact.missed_doses.len(), 1);
    }

    #[test]
    fn future_days_are_never_reported() {
        let m = med("Aspirin", &["08:00"], 30, 5);
        let report = reconcile(
            &[m],
            &[],
            date(2024, 1, 1),
            date(2024, 1, 10),
            at("2024-01-05T12:00:00Z"),
            utc(),
        );

        // Jan 1-4 missed, Jan 5 missed (08:00 < 12:00), Jan 6-10 excluded.
        assert_eq!(report.missed_doses.len(), 5);
        assert!(report
            .missed_doses
            .iter()
            .all(|d| d.time.date() <= date(2024, 1, 5)));
    }

    #[test]
    fn missed_doses_are_sorted_descending_and_capped() {
        let m = med("Aspirin", &["08:00", "20:00"], 30, 5);
        let report = reconcile(
            &[m],
            &[],
            date(2024, 1, 1),
            date(2024, 3, 1),
            at("2024-03-02T12:00:00Z"),
            utc(),
        );

        assert_eq!(report.missed_doses.len(), MISSED_DOSE_CAP);
        assert_eq!(
            report.missed_doses[0].time.to_string(),
            "2024-03-01 20:00:00"
        );
        for pair in report.missed_doses.windows(2) {
            assert!(pair[0].time > pair[1].time);
        }
    }

    #[test]
    fn missed_ids_are_deterministic() {
        let m = med("Aspirin", &["08:00"], 30, 5);
        let id = m.id;
        let report = reconcile(
            &[m],
            &[],
            date(2024, 1, 1),
            date(2024, 1, 1),
            at("2024-01-02T12:00:00Z"),
            utc(),
        );

        assert_eq!(report.missed_doses[0].id, format!("{id}|2024-01-01|08:00"));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let meds = vec![
            med("Aspirin", &["08:00"], 3, 5),
            med("Metformin", &["08:00", "18:00"], 30, 5),
        ];
        let logs = vec![taken(meds[1].id, "2024-01-01T08:10:00Z")];
        let run = || {
            reconcile(
                &meds,
                &logs,
                date(2024, 1, 1),
                date(2024, 1, 3),
                at("2024-01-03T09:00:00Z"),
                utc(),
            )
        };

        let first = serde_json::to_string(&run()).unwrap();
        let second = serde_json::to_string(&run()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn refill_reminders_trigger_at_threshold() {
        let low = med("Aspirin", &["08:00"], 5, 5);
        let fine = med("Metformin", &["08:00"], 6, 5);
        let report = reconcile(
            &[low.clone(), fine],
            &[],
            date(2024, 1, 1),
            date(2024, 1, 1),
            at("2024-01-01T00:00:00Z"),
            utc(),
        );

        assert_eq!(report.refill_reminders.len(), 1);
        assert_eq!(report.refill_reminders[0].id, low.id);
    }

    #[test]
    fn local_offset_decides_what_today_means() {
        // 23:30Z on Jan 1 is already Jan 2 at UTC+02:00, so a dose
        // scheduled for Jan 2 07:00 local is pending, not missed.
        let m = med("Aspirin", &["07:00"], 30, 5);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let report = reconcile(
            &[m],
            &[],
            date(2024, 1, 2),
            date(2024, 1, 2),
            at("2024-01-01T23:30:00Z"),
            plus_two,
        );

        assert!(report.missed_doses.is_empty());
    }

    #[test]
    fn empty_inputs_yield_empty_report() {
        let report = reconcile(
            &[],
            &[],
            date(2024, 1, 1),
            date(2024, 1, 7),
            at("2024-01-08T00:00:00Z"),
            utc(),
        );

        assert!(report.refill_reminders.is_empty());
        assert!(report.missed_doses.is_empty());
    }
}
