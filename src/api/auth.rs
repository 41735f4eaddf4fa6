use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use crate::auth::{AuthUser, hash_password, verify_password};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;
use crate::validate;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let any_blank = [
        &req.name,
        &req.email,
        &req.nim,
        &req.faculty,
        &req.major,
        &req.password,
    ]
    .iter()
    .any(|field| field.trim().is_empty());
    if any_blank {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if !validate::valid_email(req.email.trim()) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if !validate::valid_nim(req.nim.trim()) {
        return Err(AppError::BadRequest("NIM must be 8-15 digits".to_string()));
    }
    if !validate::valid_password(&req.password) {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = match repository::insert_user(&state.db, &req, &password_hash).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::BadRequest(
                "Email or NIM already registered".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    info!("registered user {} ({})", user_id, req.email.trim());
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // Every attempt counts against the window, including rejected ones.
    if !state.login_limiter.check(addr.ip()) {
        warn!("login rate limit hit for {}", addr.ip());
        return Err(AppError::TooManyRequests(
            "Too many login attempts. Try again in 15 minutes".to_string(),
        ));
    }

    let identifier = req.email.trim();
    if identifier.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email/NIM and password are required".to_string(),
        ));
    }
    if !validate::valid_email(identifier) && !validate::valid_nim(identifier) {
        return Err(AppError::BadRequest(
            "Enter a valid email address or NIM".to_string(),
        ));
    }

    let Some(user) = repository::find_user_by_identifier(&state.db, identifier).await? else {
        return Err(AppError::Unauthorized(
            "Invalid email/NIM or password".to_string(),
        ));
    };
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email/NIM or password".to_string(),
        ));
    }

    let token = state.auth.issue(user.id, &user.email)?;
    info!("user {} logged in", user.id);
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: user.into(),
        token,
    }))
}

pub async fn check_auth(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = repository::find_user_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse { user: user.into() }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim();
    if !validate::valid_email(email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    // The response never reveals whether the account exists.
    if repository::find_user_by_identifier(&state.db, email)
        .await?
        .is_some()
    {
        info!("password reset requested for {}", email);
    }

    Ok(Json(MessageResponse {
        message: "If the email is registered, reset instructions have been sent".to_string(),
    }))
}
