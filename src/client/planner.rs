use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::client::ClientError;
use crate::client::api::Api;
use crate::client::attachments::{MAX_PHOTO_BYTES, PHOTO_TYPES, encode_data_url, mime_for_path};
use crate::client::store::{LocalStore, Session, UserData};
use crate::client::workset::Workset;
use crate::models::user::majors_for;
use crate::models::{LoginRequest, PublicUser, RegisterRequest, RegisterResponse, SchedulePayload};
use crate::validate;

/// Drives every flow that touches both the server and the local store.
/// Server-owned data is only written to the cache after the server has
/// confirmed the change.
pub struct Planner {
    store: Arc<LocalStore>,
    api: Arc<dyn Api>,
}

impl Planner {
    pub fn new(store: Arc<LocalStore>, api: Arc<dyn Api>) -> Self {
        Self { store, api }
    }

    pub fn session(&self) -> Option<Session> {
        self.store.session()
    }

    fn require_session(&self) -> Result<Session, ClientError> {
        self.session().ok_or(ClientError::NoSession)
    }

    /// Opens the signed-in account's record.
    pub fn workset(&self) -> Result<Workset, ClientError> {
        let session = self.require_session()?;
        Workset::open(self.store.clone(), &session.user.email)
    }

    pub async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(ClientError::Form(
                "Email/NIM and password are required".to_string(),
            ));
        }

        let response = self
            .api
            .login(&LoginRequest {
                email: identifier.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.store.set_session(&Session {
            user: response.user.clone(),
            token: response.token,
        })?;
        info!("signed in as {}", response.user.email);
        Ok(response.user)
    }

    /// Registration mirrors the server-side checks so obviously bad forms
    /// never leave the client. A fresh empty record is seeded for the new
    /// account; no session is created until the user signs in.
    pub async fn register(
        &self,
        req: &RegisterRequest,
        confirm_password: &str,
    ) -> Result<RegisterResponse, ClientError> {
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
            return Err(ClientError::Form("All fields are required".to_string()));
        }
        if !validate::valid_email(req.email.trim()) {
            return Err(ClientError::Form("Invalid email format".to_string()));
        }
        if !validate::valid_nim(req.nim.trim()) {
            return Err(ClientError::Form("NIM must be 8-15 digits".to_string()));
        }
        let known_major = majors_for(&req.faculty)
            .is_some_and(|majors| majors.contains(&req.major.as_str()));
        if !known_major {
            return Err(ClientError::Form(
                "Select a valid faculty and major".to_string(),
            ));
        }
        if !validate::valid_password(&req.password) {
            return Err(ClientError::Form(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if req.password != confirm_password {
            return Err(ClientError::Form("Passwords do not match".to_string()));
        }

        let response = self.api.register(req).await?;
        self.store
            .save_user_data(req.email.trim(), &UserData::default())?;
        Ok(response)
    }

    /// Signing out drops the account's record along with the session, so a
    /// shared machine keeps nothing behind.
    pub fn sign_out(&self) -> Result<(), ClientError> {
        if let Some(session) = self.session() {
            self.store.remove_user_data(&session.user.email)?;
            info!("signed out {}", session.user.email);
        }
        self.store.clear_session()?;
        Ok(())
    }

    /// Revalidates the stored token and refreshes the cached profile. A 401
    /// or 403 clears the session; network trouble leaves it alone.
    pub async fn check_auth(&self) -> Result<PublicUser, ClientError> {
        let session = self.require_session()?;
        match self.api.check_auth(&session.token).await {
            Ok(user) => {
                self.store.set_session(&Session {
                    user: user.clone(),
                    token: session.token,
                })?;
                Ok(user)
            }
            Err(err) => {
                if err.is_auth() {
                    self.store.clear_session()?;
                }
                Err(err)
            }
        }
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, ClientError> {
        let email = email.trim();
        if !validate::valid_email(email) {
            return Err(ClientError::Form("Invalid email format".to_string()));
        }
        self.api.forgot_password(email).await
    }

    pub async fn update_name(&self, name: &str) -> Result<(), ClientError> {
        let session = self.require_session()?;
        let name = name.trim();
        if !validate::valid_name(name) {
            return Err(ClientError::Form(
                "Name must be 3-100 characters".to_string(),
            ));
        }

        self.api.update_profile(&session.token, name).await?;

        let mut user = session.user;
        user.name = name.to_string();
        self.store.set_session(&Session {
            user,
            token: session.token,
        })?;
        Ok(())
    }

    /// The account's record stays keyed under the old email; a later sign-in
    /// with the new address starts from a fresh record.
    pub async fn update_email(&self, email: &str) -> Result<(), ClientError> {
        let session = self.require_session()?;
        let email = email.trim();
        if !validate::valid_email(email) {
            return Err(ClientError::Form("Invalid email format".to_string()));
        }
        if email == session.user.email {
            return Err(ClientError::Form(
                "New email must be different from the current email".to_string(),
            ));
        }

        self.api.update_email(&session.token, email).await?;

        let mut user = session.user;
        user.email = email.to_string();
        self.store.set_session(&Session {
            user,
            token: session.token,
        })?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), ClientError> {
        let session = self.require_session()?;
        if current.is_empty() || new.is_empty() {
            return Err(ClientError::Form(
                "All password fields are required".to_string(),
            ));
        }
        if !validate::valid_password(new) {
            return Err(ClientError::Form(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if new != confirm {
            return Err(ClientError::Form(
                "Password confirmation does not match".to_string(),
            ));
        }

        self.api
            .change_password(&session.token, current, new)
            .await
    }

    pub async fn update_profile_photo(&self, path: &Path) -> Result<PublicUser, ClientError> {
        let session = self.require_session()?;

        let mime = mime_for_path(path);
        if !PHOTO_TYPES.contains(&mime) {
            return Err(ClientError::Form(
                "Photo must be a JPG, PNG, or GIF image".to_string(),
            ));
        }
        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_PHOTO_BYTES {
            return Err(ClientError::Form("Photo must be 5MB or smaller".to_string()));
        }

        let data = encode_data_url(path, mime).await?;
        let user = self
            .api
            .update_profile_photo(&session.token, &data)
            .await?;

        self.store.set_session(&Session {
            user: user.clone(),
            token: session.token,
        })?;
        Ok(user)
    }

    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let session = self.require_session()?;
        self.api
            .delete_account(&session.token, session.user.id)
            .await?;

        self.store.remove_user_data(&session.user.email)?;
        self.store.clear_session()?;
        info!("deleted account {}", session.user.email);
        Ok(())
    }

    /// Pulls the server's weekly schedule into the cache.
    pub async fn refresh_schedules(&self, ws: &mut Workset) -> Result<(), ClientError> {
        let session = self.require_session()?;
        let schedules = self.api.weekly_schedule(&session.token).await?;
        ws.replace_schedules(schedules)
    }

    pub async fn add_schedule(
        &self,
        ws: &mut Workset,
        payload: SchedulePayload,
    ) -> Result<i64, ClientError> {
        payload.validate()?;
        let session = self.require_session()?;

        let id = self.api.create_schedule(&session.token, &payload).await?;
        ws.insert_schedule(payload.into_schedule(id, session.user.id))?;
        Ok(id)
    }

    pub async fn update_schedule(
        &self,
        ws: &mut Workset,
        id: i64,
        payload: SchedulePayload,
    ) -> Result<(), ClientError> {
        payload.validate()?;
        let session = self.require_session()?;

        self.api
            .update_schedule(&session.token, id, &payload)
            .await?;
        ws.apply_schedule_update(payload.into_schedule(id, session.user.id))
    }

    pub async fn delete_schedule(&self, ws: &mut Workset, id: i64) -> Result<(), ClientError> {
        let session = self.require_session()?;
        self.api.delete_schedule(&session.token, id).await?;
        ws.remove_schedule(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::models::{ClassSchedule, LoginResponse};

    fn sample_user() -> PublicUser {
        PublicUser {
            id: 1,
            name: "Budi Santoso".to_string(),
            email: "budi@student.ac.id".to_string(),
            nim: "20230001".to_string(),
            faculty: "Fakultas Teknik".to_string(),
            major: "Teknik Informatika".to_string(),
            profile_photo: None,
        }
    }

    fn register_req() -> RegisterRequest {
        RegisterRequest {
            name: "Budi Santoso".to_string(),
            email: "budi@student.ac.id".to_string(),
            nim: "20230001".to_string(),
            faculty: "Fakultas Teknik".to_string(),
            major: "Teknik Informatika".to_string(),
            password: "rahasia123".to_string(),
        }
    }

    fn payload() -> SchedulePayload {
        SchedulePayload {
            day: "Mon".to_string(),
            course: "Algorithms".to_string(),
            start_time: "08:00".to_string(),
            end_time: "09:40".to_string(),
            place: None,
        }
    }

    /// Canned server for flow tests. Flags flip individual endpoints into
    /// failure modes.
    #[derive(Default)]
    struct StubApi {
        reject_auth: bool,
        reject_schedules: bool,
    }

    fn auth_rejected() -> ClientError {
        ClientError::Api {
            status: 403,
            message: "Invalid or expired token".to_string(),
        }
    }

    #[async_trait]
    impl Api for StubApi {
        async fn register(&self, _req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
            Ok(RegisterResponse {
                message: "Registration successful".to_string(),
                user_id: 1,
            })
        }

        async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
            if req.password != "rahasia123" {
                return Err(ClientError::Api {
                    status: 401,
                    message: "Invalid email/NIM or password".to_string(),
                });
            }
            Ok(LoginResponse {
                message: "Login successful".to_string(),
                user: sample_user(),
                token: "tok".to_string(),
            })
        }

        async fn forgot_password(&self, _email: &str) -> Result<String, ClientError> {
            Ok("If the email is registered, reset instructions have been sent".to_string())
        }

        async fn check_auth(&self, _token: &str) -> Result<PublicUser, ClientError> {
            if self.reject_auth {
                return Err(auth_rejected());
            }
            let mut user = sample_user();
            user.name = "Budi S.".to_string();
            Ok(user)
        }

        async fn update_profile(&self, _token: &str, _name: &str) -> Result<(), ClientError> {
            Ok(())
        }

        async fn update_email(&self, _token: &str, _email: &str) -> Result<(), ClientError> {
            Ok(())
        }

        async fn change_password(
            &self,
            _token: &str,
            _current: &str,
            _new: &str,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        async fn update_profile_photo(
            &self,
            _token: &str,
            _photo: &str,
        ) -> Result<PublicUser, ClientError> {
            Ok(sample_user())
        }

        async fn delete_account(&self, _token: &str, _user_id: i64) -> Result<(), ClientError> {
            Ok(())
        }

        async fn create_schedule(
            &self,
            _token: &str,
            _payload: &SchedulePayload,
        ) -> Result<i64, ClientError> {
            if self.reject_schedules {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Internal server error".to_string(),
                });
            }
            Ok(11)
        }

        async fn update_schedule(
            &self,
            _token: &str,
            _id: i64,
            _payload: &SchedulePayload,
        ) -> Result<(), ClientError> {
            Ok(())
        }

        async fn delete_schedule(&self, _token: &str, _id: i64) -> Result<(), ClientError> {
            Ok(())
        }

        async fn weekly_schedule(&self, _token: &str) -> Result<Vec<ClassSchedule>, ClientError> {
            Ok(vec![payload().into_schedule(11, 1)])
        }
    }

    fn planner_with(api: StubApi) -> (tempfile::TempDir, Planner) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(LocalStore::open(dir.path().join("kampusku.json")));
        (dir, Planner::new(store, Arc::new(api)))
    }

    #[tokio::test]
    async fn sign_in_stores_the_session() {
        let (_dir, planner) = planner_with(StubApi::default());
        let user = planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");
        assert_eq!(user.email, "budi@student.ac.id");

        let session = planner.session().expect("Session missing");
        assert_eq!(session.token, "tok");
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_no_session() {
        let (_dir, planner) = planner_with(StubApi::default());
        let err = planner
            .sign_in("budi@student.ac.id", "wrong")
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Api { status: 401, .. }));
        assert!(planner.session().is_none());

        let err = planner.sign_in("", "").await.expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Form(_)));
    }

    #[tokio::test]
    async fn register_seeds_an_empty_record_without_a_session() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .register(&register_req(), "rahasia123")
            .await
            .expect("Failed to register");

        assert!(planner.session().is_none());
        let data = planner
            .store
            .load_user_data("budi@student.ac.id")
            .expect("Failed to load");
        assert_eq!(data, UserData::default());
    }

    #[tokio::test]
    async fn register_rejects_mismatched_or_unknown_forms() {
        let (_dir, planner) = planner_with(StubApi::default());

        let err = planner
            .register(&register_req(), "different")
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Form(msg) if msg == "Passwords do not match"));

        let mut off_catalog = register_req();
        off_catalog.major = "Teknik Mesin".to_string();
        let err = planner
            .register(&off_catalog, "rahasia123")
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Form(msg) if msg == "Select a valid faculty and major"));
    }

    #[tokio::test]
    async fn sign_out_drops_record_and_session() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .register(&register_req(), "rahasia123")
            .await
            .expect("Failed to register");
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");

        let mut ws = planner.workset().expect("Failed to open workset");
        ws.set_theme(crate::client::store::Theme::Dark)
            .expect("Failed to set theme");

        planner.sign_out().expect("Failed to sign out");
        assert!(planner.session().is_none());

        // The record was wiped with the session.
        let data = planner
            .store
            .load_user_data("budi@student.ac.id")
            .expect("Failed to load");
        assert_eq!(data, UserData::default());
    }

    #[tokio::test]
    async fn check_auth_refreshes_the_cached_profile() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");

        let user = planner.check_auth().await.expect("Failed to check auth");
        assert_eq!(user.name, "Budi S.");
        assert_eq!(planner.session().expect("Session missing").user.name, "Budi S.");
    }

    #[tokio::test]
    async fn rejected_token_clears_the_session_but_keeps_the_record() {
        let (_dir, planner) = planner_with(StubApi {
            reject_auth: true,
            ..StubApi::default()
        });
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");
        let mut ws = planner.workset().expect("Failed to open workset");
        ws.set_theme(crate::client::store::Theme::Dark)
            .expect("Failed to set theme");

        let err = planner.check_auth().await.expect_err("Expected rejection");
        assert!(err.is_auth());
        assert!(planner.session().is_none());

        // Tasks and preferences survive; only the session is gone.
        let data = planner
            .store
            .load_user_data("budi@student.ac.id")
            .expect("Failed to load");
        assert_eq!(data.theme, crate::client::store::Theme::Dark);
    }

    #[tokio::test]
    async fn schedule_create_writes_the_cache_only_after_the_server_confirms() {
        let (_dir, planner) = planner_with(StubApi {
            reject_schedules: true,
            ..StubApi::default()
        });
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");
        let mut ws = planner.workset().expect("Failed to open workset");

        let err = planner
            .add_schedule(&mut ws, payload())
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert!(ws.schedules().is_empty());

        ws.reload().expect("Failed to reload");
        assert!(ws.schedules().is_empty());
    }

    #[tokio::test]
    async fn schedule_create_caches_the_server_id() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");
        let mut ws = planner.workset().expect("Failed to open workset");

        let id = planner
            .add_schedule(&mut ws, payload())
            .await
            .expect("Failed to add schedule");
        assert_eq!(id, 11);
        assert_eq!(ws.schedules().len(), 1);
        assert_eq!(ws.schedules()[0].id, 11);
        assert_eq!(ws.schedules()[0].user_id, 1);

        // An invalid form never reaches the server or the cache.
        let mut bad = payload();
        bad.end_time = "08:00".to_string();
        let err = planner
            .add_schedule(&mut ws, bad)
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::ScheduleForm(_)));
        assert_eq!(ws.schedules().len(), 1);
    }

    #[tokio::test]
    async fn delete_account_wipes_everything() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .register(&register_req(), "rahasia123")
            .await
            .expect("Failed to register");
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");

        planner.delete_account().await.expect("Failed to delete");
        assert!(planner.session().is_none());
    }

    #[tokio::test]
    async fn update_email_keeps_the_record_under_the_old_key() {
        let (_dir, planner) = planner_with(StubApi::default());
        planner
            .sign_in("budi@student.ac.id", "rahasia123")
            .await
            .expect("Failed to sign in");
        let mut ws = planner.workset().expect("Failed to open workset");
        ws.set_theme(crate::client::store::Theme::Dark)
            .expect("Failed to set theme");

        planner
            .update_email("budi.baru@student.ac.id")
            .await
            .expect("Failed to update email");

        let session = planner.session().expect("Session missing");
        assert_eq!(session.user.email, "budi.baru@student.ac.id");

        // Old record untouched, new address starts fresh.
        let old = planner
            .store
            .load_user_data("budi@student.ac.id")
            .expect("Failed to load");
        assert_eq!(old.theme, crate::client::store::Theme::Dark);
        let fresh = planner
            .store
            .load_user_data("budi.baru@student.ac.id")
            .expect("Failed to load");
        assert_eq!(fresh, UserData::default());

        let err = planner
            .update_email("budi.baru@student.ac.id")
            .await
            .expect_err("Expected rejection");
        assert!(matches!(err, ClientError::Form(_)));
    }
}
