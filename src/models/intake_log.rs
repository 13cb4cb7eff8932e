//! Intake events: one record per confirmed, missed, or skipped dose.
//!
//! Medication name and dosage are denormalized at log time so history
//! stays meaningful after the medication is edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::IntakeStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeLog {
    pub id: Uuid,
    /// May reference a medication since deleted; orphan logs stay valid.
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    /// Absolute instant of the intended or actual dose.
    pub time: DateTime<Utc>,
    pub status: IntakeStatus,
}

/// Client-supplied log fields; the id is assigned at insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntakeLog {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    pub time: DateTime<Utc>,
    pub status: IntakeStatus,
}
