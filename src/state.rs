use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthKeys;
use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub auth: Arc<AuthKeys>,
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: SqlitePool, auth: AuthKeys) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
            login_limiter: Arc::new(RateLimiter::for_login()),
        }
    }
}
