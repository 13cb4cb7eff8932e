//! Notifications endpoint: refill reminders and missed doses.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::adherence::{reconcile, ReconcileReport};
use crate::api::error::ApiError;
use crate::api::types::{local_offset, ApiContext, UserContext};
use crate::db;
use crate::models::IntakeLogFilter;

/// Reconciliation window: the trailing 30 local calendar days.
const WINDOW_DAYS: i64 = 30;

#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub tz_offset_minutes: Option<i32>,
}

/// `GET /api/notifications`: recomputed on every request, nothing is
/// persisted or cached.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let tz = local_offset(query.tz_offset_minutes)?;
    let now = Utc::now();

    let conn = ctx.core.open_db()?;
    let medications = db::fetch_medications(&conn, &user.user_id)?;
    let logs = db::fetch_intake_logs(&conn, &user.user_id, &IntakeLogFilter::default())?;

    let today = now.with_timezone(&tz).date_naive();
    let window_start = today - Duration::days(WINDOW_DAYS - 1);
    let report = reconcile(&medications, &logs, window_start, today, now, tz);

    Ok(Json(report))
}
