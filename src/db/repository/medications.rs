//! Medication repository: owner-scoped CRUD plus the atomic refill
//! decrement applied when a taken dose is logged.

use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Frequency;
use crate::models::{Medication, NewMedication, Refill, Schedule};

/// Inserts a medication for the given owner. Returns the stored record
/// with its generated id.
pub fn insert_medication(
    conn: &Connection,
    user_id: &str,
    input: &NewMedication,
) -> Result<Medication, DatabaseError> {
    input.validate()?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    let times_json =
        serde_json::to_string(&input.schedule.times).unwrap_or_else(|_| "[]".to_string());
    let days_json = input
        .schedule
        .days
        .as_ref()
        .map(|d| serde_json::to_string(d).unwrap_or_else(|_| "[]".to_string()));

    conn.execute(
        "INSERT INTO medications (id, user_id, name, dosage, frequency, times, days,
         refill_quantity, refill_threshold, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id.to_string(),
            user_id,
            input.name,
            input.dosage,
            input.schedule.frequency.as_str(),
            times_json,
            days_json,
            input.refill.quantity,
            input.refill.reminder_threshold,
            now,
            now,
        ],
    )?;

    Ok(Medication {
        id,
        name: input.name.clone(),
        dosage: input.dosage.clone(),
        schedule: input.schedule.clone(),
        refill: input.refill.clone(),
    })
}

/// All medications owned by the user, newest first.
pub fn fetch_medications(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dosage, frequency, times, days, refill_quantity, refill_threshold
         FROM medications WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id], medication_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

/// One medication by id, owner-scoped. `None` when absent.
pub fn get_medication(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, dosage, frequency, times, days, refill_quantity, refill_threshold
             FROM medications WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
            medication_row_from_rusqlite,
        )
        .optional()?;

    match row {
        Some(row) => Ok(Some(medication_from_row(row)?)),
        None => Ok(None),
    }
}

/// Full-record replace. Errors with NotFound when the id does not exist
/// for this owner.
pub fn update_medication(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
    input: &NewMedication,
) -> Result<Medication, DatabaseError> {
    input.validate()?;

    let times_json =
        serde_json::to_string(&input.schedule.times).unwrap_or_else(|_| "[]".to_string());
    let days_json = input
        .schedule
        .days
        .as_ref()
        .map(|d| serde_json::to_string(d).unwrap_or_else(|_| "[]".to_string()));

    let changed = conn.execute(
        "UPDATE medications
         SET name = ?1, dosage = ?2, frequency = ?3, times = ?4, days = ?5,
             refill_quantity = ?6, refill_threshold = ?7, updated_at = ?8
         WHERE id = ?9 AND user_id = ?10",
        params![
            input.name,
            input.dosage,
            input.schedule.frequency.as_str(),
            times_json,
            days_json,
            input.refill.quantity,
            input.refill.reminder_threshold,
            Utc::now(),
            id.to_string(),
            user_id,
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: id.to_string(),
        });
    }

    Ok(Medication {
        id: *id,
        name: input.name.clone(),
        dosage: input.dosage.clone(),
        schedule: input.schedule.clone(),
        refill: input.refill.clone(),
    })
}

/// Deletes a medication. Historical intake logs keep referencing its id
/// as orphans. Errors with NotFound when the id does not exist.
pub fn delete_medication(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM medications WHERE id = ?1 AND user_id = ?2",
        params![id.to_string(), user_id],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Decrements the refill supply by one, clamped at zero, in a single
/// UPDATE so concurrent taken-logs cannot drive the count negative or
/// lose a decrement. A missing medication is a no-op (`None`); the
/// intake log itself is still valid.
pub fn decrement_refill_quantity(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let changed = conn.execute(
        "UPDATE medications
         SET refill_quantity = MAX(refill_quantity - 1, 0), updated_at = ?1
         WHERE id = ?2 AND user_id = ?3",
        params![Utc::now(), id.to_string(), user_id],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    get_medication(conn, user_id, id)
}

// ───────────────────────────────────────────
// Row mapping
// ───────────────────────────────────────────

struct MedicationRow {
    id: String,
    name: String,
    dosage: String,
    frequency: String,
    times_json: String,
    days_json: Option<String>,
    refill_quantity: i64,
    refill_threshold: i64,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dosage: row.get(2)?,
        frequency: row.get(3)?,
        times_json: row.get(4)?,
        days_json: row.get(5)?,
        refill_quantity: row.get(6)?,
        refill_threshold: row.get(7)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        dosage: row.dosage,
        schedule: Schedule {
            frequency: Frequency::from_str(&row.frequency)?,
            times: serde_json::from_str(&row.times_json).unwrap_or_default(),
            days: row
                .days_json
                .map(|json| serde_json::from_str(&json).unwrap_or_default()),
        },
        refill: Refill {
            quantity: row.refill_quantity,
            reminder_threshold: row.refill_threshold,
        },
    })
}
