use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::enums::IntakeStatus;

#[derive(Debug, Default)]
pub struct IntakeLogFilter {
    pub medication_id: Option<Uuid>,
    pub status: Option<IntakeStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
