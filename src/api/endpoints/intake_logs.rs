//! Intake log endpoints.
//!
//! - `GET    /api/logs`: history, most recent first, with optional filters
//! - `POST   /api/logs`: record an intake (201); a taken dose also
//!   decrements the medication's refill supply
//! - `GET    /api/logs/:id`: detail
//! - `PUT    /api/logs/:id`: explicit edit
//! - `DELETE /api/logs/:id`: delete (204)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::{IntakeLog, IntakeLogFilter, IntakeStatus, Medication, NewIntakeLog};

#[derive(Deserialize)]
pub struct LogListQuery {
    pub medication_id: Option<Uuid>,
    pub status: Option<IntakeStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<LogListQuery>,
) -> Result<Json<Vec<IntakeLog>>, ApiError> {
    let filter = IntakeLogFilter {
        medication_id: query.medication_id,
        status: query.status,
        from: query.from,
        to: query.to,
    };

    let conn = ctx.core.open_db()?;
    let logs = db::fetch_intake_logs(&conn, &user.user_id, &filter)?;
    Ok(Json(logs))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogResponse {
    pub log: IntakeLog,
    /// Present when a taken dose decremented the medication's supply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_medication: Option<Medication>,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<NewIntakeLog>,
) -> Result<(StatusCode, Json<CreateLogResponse>), ApiError> {
    let conn = ctx.core.open_db()?;
    let log = db::insert_intake_log(&conn, &user.user_id, &input)?;

    // A log may reference a deleted medication; the decrement is then
    // a no-op and the log stands on its own.
    let updated_medication = if log.status == IntakeStatus::Taken {
        db::decrement_refill_quantity(&conn, &user.user_id, &log.medication_id)?
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateLogResponse {
            log,
            updated_medication,
        }),
    ))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<IntakeLog>, ApiError> {
    let log_id = parse_log_id(&id)?;
    let conn = ctx.core.open_db()?;
    let log = db::get_intake_log(&conn, &user.user_id, &log_id)?
        .ok_or_else(|| ApiError::NotFound("intake log not found".into()))?;
    Ok(Json(log))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(input): Json<NewIntakeLog>,
) -> Result<Json<IntakeLog>, ApiError> {
    let log_id = parse_log_id(&id)?;
    let conn = ctx.core.open_db()?;
    let log = db::update_intake_log(&conn, &user.user_id, &log_id, &input)?;
    Ok(Json(log))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let log_id = parse_log_id(&id)?;
    let conn = ctx.core.open_db()?;
    db::delete_intake_log(&conn, &user.user_id, &log_id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_log_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("invalid log id: {e}")))
}
