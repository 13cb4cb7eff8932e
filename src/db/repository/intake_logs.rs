//! Intake log repository: owner-scoped CRUD with filtered history
//! queries. medication_id is a plain column, not a foreign key, so logs
//! survive as orphans when their medication is deleted.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::IntakeStatus;
use crate::models::{IntakeLog, IntakeLogFilter, NewIntakeLog};

/// Inserts an intake log for the given owner. Returns the stored record
/// with its generated id.
pub fn insert_intake_log(
    conn: &Connection,
    user_id: &str,
    input: &NewIntakeLog,
) -> Result<IntakeLog, DatabaseError> {
    let id = Uuid::new_v4();

    conn.execute(
        "INSERT INTO intake_logs (id, user_id, medication_id, medication_name, dosage,
         taken_at, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            user_id,
            input.medication_id.to_string(),
            input.medication_name,
            input.dosage,
            input.time,
            input.status.as_str(),
            Utc::now(),
        ],
    )?;

    Ok(IntakeLog {
        id,
        medication_id: input.medication_id,
        medication_name: input.medication_name.clone(),
        dosage: input.dosage.clone(),
        time: input.time,
        status: input.status.clone(),
    })
}

/// Intake history for the user, most recent first, with optional
/// medication/status/window filters.
pub fn fetch_intake_logs(
    conn: &Connection,
    user_id: &str,
    filter: &IntakeLogFilter,
) -> Result<Vec<IntakeLog>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, medication_id, medication_name, dosage, taken_at, status
         FROM intake_logs WHERE user_id = ?1",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id.to_string())];

    if let Some(ref med_id) = filter.medication_id {
        params_vec.push(Box::new(med_id.to_string()));
        sql.push_str(&format!(" AND medication_id = ?{}", params_vec.len()));
    }
    if let Some(ref status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    if let Some(from) = filter.from {
        params_vec.push(Box::new(from));
        sql.push_str(&format!(" AND taken_at >= ?{}", params_vec.len()));
    }
    if let Some(to) = filter.to {
        params_vec.push(Box::new(to));
        sql.push_str(&format!(" AND taken_at <= ?{}", params_vec.len()));
    }

    sql.push_str(" ORDER BY taken_at DESC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), log_row_from_rusqlite)?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(log_from_row(row?)?);
    }
    Ok(logs)
}

/// One intake log by id, owner-scoped. `None` when absent.
pub fn get_intake_log(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<Option<IntakeLog>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, medication_id, medication_name, dosage, taken_at, status
             FROM intake_logs WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
            log_row_from_rusqlite,
        )
        .optional()?;

    match row {
        Some(row) => Ok(Some(log_from_row(row)?)),
        None => Ok(None),
    }
}

/// Explicit edit of a recorded log (logs are otherwise immutable).
/// Errors with NotFound when the id does not exist for this owner.
pub fn update_intake_log(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
    input: &NewIntakeLog,
) -> Result<IntakeLog, DatabaseError> {
    let changed = conn.execute(
        "UPDATE intake_logs
         SET medication_id = ?1, medication_name = ?2, dosage = ?3, taken_at = ?4, status = ?5
         WHERE id = ?6 AND user_id = ?7",
        params![
            input.medication_id.to_string(),
            input.medication_name,
            input.dosage,
            input.time,
            input.status.as_str(),
            id.to_string(),
            user_id,
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "intake_log".into(),
            id: id.to_string(),
        });
    }

    Ok(IntakeLog {
        id: *id,
        medication_id: input.medication_id,
        medication_name: input.medication_name.clone(),
        dosage: input.dosage.clone(),
        time: input.time,
        status: input.status.clone(),
    })
}

/// Deletes an intake log. Errors with NotFound when the id does not exist.
pub fn delete_intake_log(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM intake_logs WHERE id = ?1 AND user_id = ?2",
        params![id.to_string(), user_id],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "intake_log".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ───────────────────────────────────────────
// Row mapping
// ───────────────────────────────────────────

struct IntakeLogRow {
    id: String,
    medication_id: String,
    medication_name: String,
    dosage: String,
    taken_at: DateTime<Utc>,
    status: String,
}

fn log_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<IntakeLogRow, rusqlite::Error> {
    Ok(IntakeLogRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        medication_name: row.get(2)?,
        dosage: row.get(3)?,
        taken_at: row.get(4)?,
        status: row.get(5)?,
    })
}

fn log_from_row(row: IntakeLogRow) -> Result<IntakeLog, DatabaseError> {
    Ok(IntakeLog {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        medication_id: Uuid::parse_str(&row.medication_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        medication_name: row.medication_name,
        dosage: row.dosage,
        time: row.taken_at,
        status: IntakeStatus::from_str(&row.status)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::medications::{
        delete_medication, insert_medication,
    };
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Frequency;
    use crate::models::{NewMedication, Refill, Schedule};

    fn test_log(med_id: Uuid, time: &str, status: IntakeStatus) -> NewIntakeLog {
        NewIntakeLog {
            medication_id: med_id,
            medication_name: "Aspirin".into(),
            dosage: "81mg".into(),
            time: time.parse().unwrap(),
            status,
        }
    }

    #[test]
    fn insert_and_fetch_newest_first() {
        let conn = open_memory_database().unwrap();
        let med_id = Uuid::new_v4();
        insert_intake_log(&conn, "u1", &test_log(med_id, "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();
        insert_intake_log(&conn, "u1", &test_log(med_id, "2024-01-03T08:00:00Z", IntakeStatus::Taken)).unwrap();
        insert_intake_log(&conn, "u1", &test_log(med_id, "2024-01-02T08:00:00Z", IntakeStatus::Missed)).unwrap();

        let logs = fetch_intake_logs(&conn, "u1", &IntakeLogFilter::default()).unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].time, "2024-01-03T08:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(logs[2].time, "2024-01-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn fetch_filters_by_medication_and_status() {
        let conn = open_memory_database().unwrap();
        let aspirin = Uuid::new_v4();
        let other = Uuid::new_v4();
        insert_intake_log(&conn, "u1", &test_log(aspirin, "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();
        insert_intake_log(&conn, "u1", &test_log(aspirin, "2024-01-02T08:00:00Z", IntakeStatus::Skipped)).unwrap();
        insert_intake_log(&conn, "u1", &test_log(other, "2024-01-01T09:00:00Z", IntakeStatus::Taken)).unwrap();

        let filter = IntakeLogFilter {
            medication_id: Some(aspirin),
            status: Some(IntakeStatus::Taken),
            ..Default::default()
        };
        let logs = fetch_intake_logs(&conn, "u1", &filter).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].medication_id, aspirin);
        assert_eq!(logs[0].status, IntakeStatus::Taken);
    }

    #[test]
    fn fetch_window_bounds_are_inclusive() {
        let conn = open_memory_database().unwrap();
        let med_id = Uuid::new_v4();
        for time in [
            "2024-01-01T08:00:00Z",
            "2024-01-02T08:00:00Z",
            "2024-01-03T08:00:00Z",
        ] {
            insert_intake_log(&conn, "u1", &test_log(med_id, time, IntakeStatus::Taken)).unwrap();
        }

        let filter = IntakeLogFilter {
            from: Some("2024-01-01T08:00:00Z".parse().unwrap()),
            to: Some("2024-01-02T08:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let logs = fetch_intake_logs(&conn, "u1", &filter).unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn fetch_is_owner_scoped() {
        let conn = open_memory_database().unwrap();
        insert_intake_log(&conn, "alice", &test_log(Uuid::new_v4(), "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();

        assert_eq!(fetch_intake_logs(&conn, "alice", &IntakeLogFilter::default()).unwrap().len(), 1);
        assert!(fetch_intake_logs(&conn, "bob", &IntakeLogFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn update_replaces_fields() {
        let conn = open_memory_database().unwrap();
        let log = insert_intake_log(&conn, "u1", &test_log(Uuid::new_v4(), "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();

        let mut edit = test_log(log.medication_id, "2024-01-01T09:15:00Z", IntakeStatus::Skipped);
        edit.dosage = "162mg".into();
        let updated = update_intake_log(&conn, "u1", &log.id, &edit).unwrap();
        assert_eq!(updated.id, log.id);

        let stored = get_intake_log(&conn, "u1", &log.id).unwrap().unwrap();
        assert_eq!(stored.status, IntakeStatus::Skipped);
        assert_eq!(stored.dosage, "162mg");
        assert_eq!(stored.time, "2024-01-01T09:15:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn update_missing_returns_not_found() {
        let conn = open_memory_database().unwrap();
        let result = update_intake_log(
            &conn,
            "u1",
            &Uuid::new_v4(),
            &test_log(Uuid::new_v4(), "2024-01-01T08:00:00Z", IntakeStatus::Taken),
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn delete_removes_row() {
        let conn = open_memory_database().unwrap();
        let log = insert_intake_log(&conn, "u1", &test_log(Uuid::new_v4(), "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();
        delete_intake_log(&conn, "u1", &log.id).unwrap();
        assert!(get_intake_log(&conn, "u1", &log.id).unwrap().is_none());

        let again = delete_intake_log(&conn, "u1", &log.id);
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn logs_survive_medication_delete_as_orphans() {
        let conn = open_memory_database().unwrap();
        let med = insert_medication(
            &conn,
            "u1",
            &NewMedication {
                name: "Aspirin".into(),
                dosage: "81mg".into(),
                schedule: Schedule {
                    frequency: Frequency::Daily,
                    times: vec!["08:00".into()],
                    days: None,
                },
                refill: Refill { quantity: 10, reminder_threshold: 2 },
            },
        )
        .unwrap();
        let log = insert_intake_log(&conn, "u1", &test_log(med.id, "2024-01-01T08:00:00Z", IntakeStatus::Taken)).unwrap();

        delete_medication(&conn, "u1", &med.id).unwrap();

        let orphan = get_intake_log(&conn, "u1", &log.id).unwrap().unwrap();
        assert_eq!(orphan.medication_id, med.id);
        assert_eq!(orphan.medication_name, "Aspirin");
    }
}
