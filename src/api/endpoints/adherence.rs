//! Adherence series endpoint.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::adherence::{aggregate_adherence, AdherenceDay};
use crate::api::error::ApiError;
use crate::api::types::{local_offset, ApiContext, UserContext};
use crate::db;
use crate::models::IntakeLogFilter;

const DEFAULT_WINDOW_DAYS: u32 = 7;
const MAX_WINDOW_DAYS: u32 = 90;

#[derive(Deserialize)]
pub struct AdherenceQuery {
    pub days: Option<u32>,
    pub tz_offset_minutes: Option<i32>,
}

/// `GET /api/adherence?days=7`: per-day taken/scheduled counts for the
/// window ending today, oldest first.
pub async fn series(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<AdherenceQuery>,
) -> Result<Json<Vec<AdherenceDay>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
        )));
    }
    let tz = local_offset(query.tz_offset_minutes)?;
    let reference_date = Utc::now().with_timezone(&tz).date_naive();

    let conn = ctx.core.open_db()?;
    let medications = db::fetch_medications(&conn, &user.user_id)?;
    let logs = db::fetch_intake_logs(&conn, &user.user_id, &IntakeLogFilter::default())?;

    let series = aggregate_adherence(&medications, &logs, days, reference_date, tz);
    Ok(Json(series))
}
