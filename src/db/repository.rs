use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{ClassSchedule, RegisterRequest, SchedulePayload, User};

const USER_COLUMNS: &str =
    "id, name, email, nim, faculty, major, password_hash, profile_photo, created_at";

pub async fn insert_user(
    db: &SqlitePool,
    req: &RegisterRequest,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO users (name, email, nim, faculty, major, password_hash, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(req.nim.trim())
    .bind(&req.faculty)
    .bind(&req.major)
    .bind(password_hash)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Looks a user up by email or NIM; the login form accepts either.
pub async fn find_user_by_identifier(
    db: &SqlitePool,
    identifier: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? OR nim = ?"
    ))
    .bind(identifier)
    .bind(identifier)
    .fetch_optional(db)
    .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// True when another account already owns `email`.
pub async fn email_in_use(
    db: &SqlitePool,
    email: &str,
    exclude_id: i64,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM users WHERE email = ? AND id != ?")
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

pub async fn update_user_name(db: &SqlitePool, id: i64, name: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_user_email(db: &SqlitePool, id: i64, email: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET email = ? WHERE id = ?")
        .bind(email)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_user_password(
    db: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_user_photo(db: &SqlitePool, id: i64, photo: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET profile_photo = ? WHERE id = ?")
        .bind(photo)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Schedules go with the account via the FK cascade.
pub async fn delete_user(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_schedule(
    db: &SqlitePool,
    user_id: i64,
    payload: &SchedulePayload,
) -> Result<i64, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO class_schedules (user_id, day, course, start_time, end_time, place, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(user_id)
    .bind(payload.day.trim())
    .bind(payload.course.trim())
    .bind(&payload.start_time)
    .bind(&payload.end_time)
    .bind(&payload.place)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

/// The user's full week, Monday-first, then by start time within a day.
pub async fn fetch_weekly_schedules(
    db: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ClassSchedule>, sqlx::Error> {
    sqlx::query_as::<_, ClassSchedule>(
        r#"
        SELECT id, user_id, day, course, start_time, end_time, place, created_at
        FROM class_schedules
        WHERE user_id = ?
        ORDER BY
            CASE day
                WHEN 'Mon' THEN 1
                WHEN 'Tue' THEN 2
                WHEN 'Wed' THEN 3
                WHEN 'Thu' THEN 4
                WHEN 'Fri' THEN 5
                WHEN 'Sat' THEN 6
                WHEN 'Sun' THEN 7
            END,
            start_time
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn update_schedule(
    db: &SqlitePool,
    user_id: i64,
    id: i64,
    payload: &SchedulePayload,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE class_schedules SET day = ?, course = ?, start_time = ?, end_time = ?, place = ? WHERE id = ? AND user_id = ?"
    )
    .bind(payload.day.trim())
    .bind(payload.course.trim())
    .bind(&payload.start_time)
    .bind(&payload.end_time)
    .bind(&payload.place)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_schedule(db: &SqlitePool, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM class_schedules WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
