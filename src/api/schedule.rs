use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SchedulePayload>,
) -> Result<(StatusCode, Json<ScheduleCreatedResponse>), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let id = repository::insert_schedule(&state.db, auth.user_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScheduleCreatedResponse {
            message: "Schedule added successfully".to_string(),
            id,
        }),
    ))
}

pub async fn weekly_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<WeeklyScheduleResponse>, AppError> {
    let schedules = repository::fetch_weekly_schedules(&state.db, auth.user_id).await?;
    Ok(Json(WeeklyScheduleResponse { schedules }))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<SchedulePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    if !repository::update_schedule(&state.db, auth.user_id, id, &payload).await? {
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Schedule updated successfully".to_string(),
    }))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete_schedule(&state.db, auth.user_id, id).await? {
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Schedule deleted successfully".to_string(),
    }))
}
