//! Schedule suggestion endpoint, delegating to the advisor.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advisor::{IntakeSample, ScheduleSuggestion, SuggestionRequest};
use crate::api::error::ApiError;
use crate::api::types::{local_offset, ApiContext, UserContext};
use crate::db;
use crate::models::{IntakeLogFilter, IntakeStatus};

/// Most recent taken logs forwarded to the model.
const HISTORY_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsBody {
    pub medication_id: Uuid,
    #[serde(default)]
    pub user_needs: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub suggested_schedule: Vec<ScheduleSuggestion>,
}

/// `POST /api/suggestions`: assembles the medication's taken history
/// and asks the advisor for reminder times. Advisor failures surface as
/// 502, never touching stored data.
pub async fn suggest(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<SuggestionsQuery>,
    Json(body): Json<SuggestionsBody>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let tz = local_offset(query.tz_offset_minutes)?;

    // Connection is scoped so it is dropped before awaiting the advisor.
    let request = {
        let conn = ctx.core.open_db()?;
        let medication = db::get_medication(&conn, &user.user_id, &body.medication_id)?
            .ok_or_else(|| ApiError::NotFound("medication not found".into()))?;
        let filter = IntakeLogFilter {
            medication_id: Some(body.medication_id),
            status: Some(IntakeStatus::Taken),
            ..Default::default()
        };
        let logs = db::fetch_intake_logs(&conn, &user.user_id, &filter)?;

        let intake_logs = logs
            .iter()
            .take(HISTORY_LIMIT)
            .map(|log| {
                let local = log.time.with_timezone(&tz);
                IntakeSample {
                    date: local.date_naive().to_string(),
                    time: local.format("%H:%M").to_string(),
                }
            })
            .collect();

        SuggestionRequest {
            medication_name: medication.name,
            dosage: medication.dosage,
            intake_logs,
            user_needs: body.user_needs,
        }
    };

    let suggested_schedule = ctx.core.advisor().suggest(&request).await?;
    Ok(Json(SuggestionsResponse { suggested_schedule }))
}
