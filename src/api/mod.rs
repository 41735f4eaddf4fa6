use axum::routing::{delete, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::state::AppState;

pub mod auth;
pub mod profile;
pub mod schedule;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/forgot-password", post(auth::forgot_password))
        .route("/api/check-auth", get(auth::check_auth))
        .route("/api/update-profile", put(profile::update_profile))
        .route("/api/update-email", put(profile::update_email))
        .route("/api/change-password", put(profile::change_password))
        .route("/api/update-profile-photo", put(profile::update_profile_photo))
        .route("/api/delete-account", delete(profile::delete_account))
        .route("/api/class-schedule", post(schedule::create_schedule))
        .route("/api/class-schedule/weekly", get(schedule::weekly_schedule))
        .route(
            "/api/class-schedule/{id}",
            put(schedule::update_schedule).delete(schedule::delete_schedule),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
