use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub exp: usize,
}

/// Signing and verification keys for session tokens, derived from one
/// shared secret.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "kampusku-dev-secret".to_string());
        Self::new(&secret)
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AppError> {
        let exp = (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let claims = Claims {
            user_id,
            email: email.to_string(),
            exp,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AppError::InternalServerError)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Forbidden("Invalid or expired token".to_string()))
    }
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|_| AppError::InternalServerError)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(plain, hash).map_err(|_| AppError::InternalServerError)
}

/// Authenticated caller, extracted from the `Authorization` header of a
/// protected route. Missing header is 401, bad or expired token 403.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        let claims = state.auth.verify(token)?;
        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = AuthKeys::new("test-secret");
        let token = keys.issue(7, "budi@student.ac.id").expect("issue token");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "budi@student.ac.id");
    }

    #[test]
    fn garbage_token_rejected() {
        let keys = AuthKeys::new("test-secret");
        assert!(keys.verify("not-a-token").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let token = AuthKeys::new("first").issue(1, "a@b.co").expect("issue token");
        assert!(AuthKeys::new("second").verify(&token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("rahasia123").expect("hash");
        assert!(verify_password("rahasia123", &hash).expect("verify"));
        assert!(!verify_password("salah", &hash).expect("verify"));
    }
}
