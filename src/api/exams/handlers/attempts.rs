use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::exam::{AttemptResponse, SaveResponseAck, SaveResponseRequest, StartExamRequest};

pub(in crate::api::exams) async fn start_exam(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<StartExamRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempt = state.attempts().start(&user.id, payload.paper_ids).await?;

    Ok(Json(AttemptResponse::from_attempt(attempt, primitive_now_utc())))
}

pub(in crate::api::exams) async fn save_response(
    Path(attempt_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SaveResponseRequest>,
) -> Result<Json<SaveResponseAck>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let command =
        payload.into_command().map_err(|e| ApiError::BadRequest(format!("Invalid answer: {e}")))?;

    state.attempts().save_response(&attempt_id, &user.id, command).await?;

    Ok(Json(SaveResponseAck { success: true }))
}

pub(in crate::api::exams) async fn submit_exam(
    Path(attempt_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = state.attempts().submit(&attempt_id, &user.id).await?;

    Ok(Json(AttemptResponse::from_attempt(attempt, primitive_now_utc())))
}

pub(in crate::api::exams) async fn get_attempt(
    Path(attempt_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = state.attempts().get(&attempt_id, &user.id).await?;

    Ok(Json(AttemptResponse::from_attempt(attempt, primitive_now_utc())))
}

pub(in crate::api::exams) async fn list_attempts(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttemptResponse>>, ApiError> {
    let attempts = state.attempts().list_by_owner(&user.id).await?;
    let now = primitive_now_utc();

    Ok(Json(
        attempts.into_iter().map(|attempt| AttemptResponse::from_attempt(attempt, now)).collect(),
    ))
}
