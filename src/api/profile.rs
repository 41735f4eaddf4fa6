use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::auth::{AuthUser, hash_password, verify_password};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;
use crate::validate;

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = req.name.trim();
    if !validate::valid_name(name) {
        return Err(AppError::BadRequest(
            "Name must be 3-100 characters".to_string(),
        ));
    }

    if !repository::update_user_name(&state.db, auth.user_id, name).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Profile updated successfully".to_string(),
    }))
}

pub async fn update_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim();
    if !validate::valid_email(email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if repository::email_in_use(&state.db, email, auth.user_id).await? {
        return Err(AppError::BadRequest("Email already in use".to_string()));
    }

    if !repository::update_user_email(&state.db, auth.user_id, email).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("user {} changed email", auth.user_id);
    Ok(Json(MessageResponse {
        message: "Email updated successfully".to_string(),
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if !validate::valid_password(&req.new_password) {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let user = repository::find_user_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&req.new_password)?;
    repository::update_user_password(&state.db, auth.user_id, &password_hash).await?;
    info!("user {} changed password", auth.user_id);
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

pub async fn update_profile_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdatePhotoRequest>,
) -> Result<Json<PhotoResponse>, AppError> {
    if req.photo.trim().is_empty() {
        return Err(AppError::BadRequest("Photo data is required".to_string()));
    }

    if !repository::update_user_photo(&state.db, auth.user_id, &req.photo).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let user = repository::find_user_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(PhotoResponse {
        message: "Profile photo updated successfully".to_string(),
        user: user.into(),
    }))
}

pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.user_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own account".to_string(),
        ));
    }

    if !repository::delete_user(&state.db, auth.user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("user {} deleted their account", auth.user_id);
    Ok(Json(MessageResponse {
        message: "Account deleted successfully".to_string(),
    }))
}
