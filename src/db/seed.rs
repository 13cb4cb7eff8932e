//! Demo dataset: a small set of medications and a few days of intake
//! history, inserted on first run when seeding is enabled. Log instants
//! are generated relative to `now` so the dashboard has data the moment
//! the server starts.

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::Connection;

use crate::db::repository::{fetch_medications, insert_intake_log, insert_medication};
use crate::db::DatabaseError;
use crate::models::enums::{Frequency, IntakeStatus};
use crate::models::{NewIntakeLog, NewMedication, Refill, Schedule};

/// Seeds demo medications and logs for the user. Skips (returning
/// `false`) when the user already has any medication.
pub fn seed_demo_data(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    if !fetch_medications(conn, user_id)?.is_empty() {
        return Ok(false);
    }

    let meds: [(&str, &str, &[&str], i64, i64); 5] = [
        ("Aspirin", "81mg", &["08:00"], 28, 5),
        ("Vitamin D", "1000 IU", &["09:00"], 45, 10),
        ("Metformin", "500mg", &["08:00", "18:00"], 56, 14),
        ("Lisinopril", "10mg", &["07:00"], 30, 7),
        ("Melatonin", "3mg", &["21:00"], 20, 5),
    ];

    let mut inserted = Vec::with_capacity(meds.len());
    for (name, dosage, times, quantity, threshold) in meds {
        let med = insert_medication(
            conn,
            user_id,
            &NewMedication {
                name: name.into(),
                dosage: dosage.into(),
                schedule: Schedule {
                    frequency: Frequency::Daily,
                    times: times.iter().map(|s| s.to_string()).collect(),
                    days: None,
                },
                refill: Refill {
                    quantity,
                    reminder_threshold: threshold,
                },
            },
        )?;
        inserted.push(med);
    }

    // (medication index, days ago, time of day, status)
    let logs: [(usize, i64, &str, IntakeStatus); 10] = [
        (0, 0, "08:05", IntakeStatus::Taken),
        (1, 0, "09:10", IntakeStatus::Taken),
        (2, 0, "08:02", IntakeStatus::Taken),
        (0, 1, "08:15", IntakeStatus::Taken),
        (1, 1, "09:00", IntakeStatus::Taken),
        (2, 1, "08:00", IntakeStatus::Taken),
        (2, 1, "18:10", IntakeStatus::Taken),
        (3, 1, "07:00", IntakeStatus::Taken),
        (4, 1, "21:05", IntakeStatus::Taken),
        (3, 2, "07:30", IntakeStatus::Missed),
    ];

    for (med_idx, days_ago, time, status) in logs {
        let med = &inserted[med_idx];
        insert_intake_log(
            conn,
            user_id,
            &NewIntakeLog {
                medication_id: med.id,
                medication_name: med.name.clone(),
                dosage: med.dosage.clone(),
                time: instant_days_ago(now, days_ago, time),
                status,
            },
        )?;
    }

    tracing::info!(user_id, "Seeded demo data: {} medications", inserted.len());
    Ok(true)
}

fn instant_days_ago(now: DateTime<Utc>, days_ago: i64, time: &str) -> DateTime<Utc> {
    let date = now.date_naive() - chrono::Duration::days(days_ago);
    let tod = NaiveTime::parse_from_str(time, "%H:%M").unwrap_or_default();
    date.and_time(tod).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fetch_intake_logs;
    use crate::db::sqlite::open_memory_database;
    use crate::models::IntakeLogFilter;

    #[test]
    fn seed_inserts_demo_set_once() {
        let conn = open_memory_database().unwrap();
        let now = "2024-06-15T12:00:00Z".parse().unwrap();

        assert!(seed_demo_data(&conn, "u1", now).unwrap());
        let meds = fetch_medications(&conn, "u1").unwrap();
        let logs = fetch_intake_logs(&conn, "u1", &IntakeLogFilter::default()).unwrap();
        assert_eq!(meds.len(), 5);
        assert_eq!(logs.len(), 10);

        // Second run is a no-op.
        assert!(!seed_demo_data(&conn, "u1", now).unwrap());
        assert_eq!(fetch_medications(&conn, "u1").unwrap().len(), 5);
    }

    #[test]
    fn seeded_logs_reference_seeded_medications() {
        let conn = open_memory_database().unwrap();
        let now = "2024-06-15T12:00:00Z".parse().unwrap();
        seed_demo_data(&conn, "u1", now).unwrap();

        let med_ids: Vec<_> = fetch_medications(&conn, "u1")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        let logs = fetch_intake_logs(&conn, "u1", &IntakeLogFilter::default()).unwrap();
        assert!(logs.iter().all(|log| med_ids.contains(&log.medication_id)));
    }

    #[test]
    fn seeded_log_instants_are_relative_to_now() {
        let conn = open_memory_database().unwrap();
        let now: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        seed_demo_data(&conn, "u1", now).unwrap();

        let logs = fetch_intake_logs(&conn, "u1", &IntakeLogFilter::default()).unwrap();
        let oldest = logs.iter().map(|l| l.time).min().unwrap();
        let newest = logs.iter().map(|l| l.time).max().unwrap();
        assert_eq!(oldest.date_naive().to_string(), "2024-06-13");
        assert_eq!(newest.date_naive().to_string(), "2024-06-15");
    }
}
