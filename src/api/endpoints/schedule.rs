//! Today's schedule endpoint.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use chrono::{Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adherence::{expand_schedule, IntakeIndex};
use crate::api::error::ApiError;
use crate::api::types::{local_offset, ApiContext, UserContext};
use crate::db;
use crate::models::IntakeLogFilter;

#[derive(Deserialize)]
pub struct ScheduleQuery {
    pub tz_offset_minutes: Option<i32>,
}

/// One dose expected today, with its hour-bucket taken flag.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayDose {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub dosage: String,
    /// Scheduled time of day as "HH:MM".
    pub time: String,
    pub taken: bool,
}

/// `GET /api/schedule/today`: today's expanded doses sorted by time
/// of day.
pub async fn today(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<TodayDose>>, ApiError> {
    let tz = local_offset(query.tz_offset_minutes)?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    let conn = ctx.core.open_db()?;
    let medications = db::fetch_medications(&conn, &user.user_id)?;
    let logs = db::fetch_intake_logs(&conn, &user.user_id, &IntakeLogFilter::default())?;
    let index = IntakeIndex::build(&logs, tz);

    let mut doses: Vec<TodayDose> = medications
        .iter()
        .flat_map(|medication| expand_schedule(medication, today, today))
        .map(|dose| TodayDose {
            taken: index.was_taken(dose.medication_id, dose.at.date(), dose.at.hour()),
            medication_id: dose.medication_id,
            medication_name: dose.medication_name,
            dosage: dose.dosage,
            time: dose.time_of_day,
        })
        .collect();
    doses.sort_by(|a, b| a.time.cmp(&b.time));

    Ok(Json(doses))
}
