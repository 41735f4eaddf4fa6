use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub nim: String,
    pub faculty: String,
    pub major: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_photo: Option<String>,
    pub created_at: String,
}

/// Projection returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub nim: String,
    pub faculty: String,
    pub major: String,
    pub profile_photo: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            nim: user.nim,
            faculty: user.faculty,
            major: user.major,
            profile_photo: user.profile_photo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub nim: String,
    pub faculty: String,
    pub major: String,
    pub password: String,
}

/// The `email` field also accepts a NIM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePhotoRequest {
    pub photo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Faculties offered at registration, each with its majors. Informational
/// only; the server stores whatever strings the form submitted.
pub const FACULTIES: &[(&str, &[&str])] = &[
    ("Fakultas Teknik", &["Teknik Sipil", "Teknik Informatika"]),
    ("Fakultas Ekonomi dan Bisnis", &["Akuntansi", "Manajemen"]),
    (
        "Fakultas Pertanian dan Peternakan",
        &["Agroteknologi", "Agribisnis", "Peternakan"],
    ),
    (
        "Fakultas Keguruan dan Ilmu Pendidikan",
        &["PGSD", "Pendidikan Bahasa Inggris"],
    ),
    ("Fakultas Ilmu Kesehatan", &["Farmasi"]),
    ("Fakultas Hukum", &["Ilmu Hukum"]),
];

pub fn majors_for(faculty: &str) -> Option<&'static [&'static str]> {
    FACULTIES
        .iter()
        .find(|(name, _)| *name == faculty)
        .map(|(_, majors)| *majors)
}
