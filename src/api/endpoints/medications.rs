//! Medication CRUD endpoints.
//!
//! - `GET    /api/medications`: list, newest first
//! - `POST   /api/medications`: create (201)
//! - `GET    /api/medications/:id`: detail
//! - `PUT    /api/medications/:id`: full-record replace
//! - `DELETE /api/medications/:id`: delete (204)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::{Medication, NewMedication};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let medications = db::fetch_medications(&conn, &user.user_id)?;
    Ok(Json(medications))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<NewMedication>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let conn = ctx.core.open_db()?;
    let medication = db::insert_medication(&conn, &user.user_id, &input)?;
    Ok((StatusCode::CREATED, Json(medication)))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    let medication_id = parse_medication_id(&id)?;
    let conn = ctx.core.open_db()?;
    let medication = db::get_medication(&conn, &user.user_id, &medication_id)?
        .ok_or_else(|| ApiError::NotFound("medication not found".into()))?;
    Ok(Json(medication))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(input): Json<NewMedication>,
) -> Result<Json<Medication>, ApiError> {
    let medication_id = parse_medication_id(&id)?;
    let conn = ctx.core.open_db()?;
    let medication = db::update_medication(&conn, &user.user_id, &medication_id, &input)?;
    Ok(Json(medication))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let medication_id = parse_medication_id(&id)?;
    let conn = ctx.core.open_db()?;
    db::delete_medication(&conn, &user.user_id, &medication_id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_medication_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("invalid medication id: {e}")))
}
