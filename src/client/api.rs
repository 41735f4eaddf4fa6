use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::ClientError;
use crate::error::ErrorBody;
use crate::models::{
    ClassSchedule, LoginRequest, LoginResponse, MessageResponse, PublicUser, RegisterRequest,
    RegisterResponse, SchedulePayload, ScheduleCreatedResponse, UserResponse,
    WeeklyScheduleResponse,
};

/// Everything the client needs from the server. Kept behind a trait so flows
/// can run against a stub in tests.
#[async_trait]
pub trait Api: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError>;
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;
    async fn forgot_password(&self, email: &str) -> Result<String, ClientError>;
    async fn check_auth(&self, token: &str) -> Result<PublicUser, ClientError>;
    async fn update_profile(&self, token: &str, name: &str) -> Result<(), ClientError>;
    async fn update_email(&self, token: &str, email: &str) -> Result<(), ClientError>;
    async fn change_password(
        &self,
        token: &str,
        current: &str,
        new: &str,
    ) -> Result<(), ClientError>;
    async fn update_profile_photo(&self, token: &str, photo: &str)
    -> Result<PublicUser, ClientError>;
    async fn delete_account(&self, token: &str, user_id: i64) -> Result<(), ClientError>;
    async fn create_schedule(
        &self,
        token: &str,
        payload: &SchedulePayload,
    ) -> Result<i64, ClientError>;
    async fn update_schedule(
        &self,
        token: &str,
        id: i64,
        payload: &SchedulePayload,
    ) -> Result<(), ClientError>;
    async fn delete_schedule(&self, token: &str, id: i64) -> Result<(), ClientError>;
    async fn weekly_schedule(&self, token: &str) -> Result<Vec<ClassSchedule>, ClientError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(response.json().await?)
}

async fn read_ok(response: Response) -> Result<(), ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(())
}

/// Turns a failed response into `ClientError::Api`, carrying the server's
/// `error` field when the body has one.
async fn api_error(status: StatusCode, response: Response) -> ClientError {
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status {}", status.as_u16()),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/api/register"))
            .json(req)
            .send()
            .await?;
        read_json(response).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(req)
            .send()
            .await?;
        read_json(response).await
    }

    async fn forgot_password(&self, email: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/api/forgot-password"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        let body: MessageResponse = read_json(response).await?;
        Ok(body.message)
    }

    async fn check_auth(&self, token: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .get(self.url("/api/check-auth"))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        let body: UserResponse = read_json(response).await?;
        Ok(body.user)
    }

    async fn update_profile(&self, token: &str, name: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url("/api/update-profile"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        read_ok(response).await
    }

    async fn update_email(&self, token: &str, email: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url("/api/update-email"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        read_ok(response).await
    }

    async fn change_password(
        &self,
        token: &str,
        current: &str,
        new: &str,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url("/api/change-password"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "currentPassword": current, "newPassword": new }))
            .send()
            .await?;
        read_ok(response).await
    }

    async fn update_profile_photo(
        &self,
        token: &str,
        photo: &str,
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .put(self.url("/api/update-profile-photo"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "photo": photo }))
            .send()
            .await?;
        let body: crate::models::PhotoResponse = read_json(response).await?;
        Ok(body.user)
    }

    async fn delete_account(&self, token: &str, user_id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url("/api/delete-account"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "userId": user_id }))
            .send()
            .await?;
        read_ok(response).await
    }

    async fn create_schedule(
        &self,
        token: &str,
        payload: &SchedulePayload,
    ) -> Result<i64, ClientError> {
        let response = self
            .client
            .post(self.url("/api/class-schedule"))
            .header("Authorization", format!("Bearer {}", token))
            .json(payload)
            .send()
            .await?;
        let body: ScheduleCreatedResponse = read_json(response).await?;
        Ok(body.id)
    }

    async fn update_schedule(
        &self,
        token: &str,
        id: i64,
        payload: &SchedulePayload,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/api/class-schedule/{}", id)))
            .header("Authorization", format!("Bearer {}", token))
            .json(payload)
            .send()
            .await?;
        read_ok(response).await
    }

    async fn delete_schedule(&self, token: &str, id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/class-schedule/{}", id)))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        read_ok(response).await
    }

    async fn weekly_schedule(&self, token: &str) -> Result<Vec<ClassSchedule>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/class-schedule/weekly"))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        let body: WeeklyScheduleResponse = read_json(response).await?;
        Ok(body.schedules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://127.0.0.1:3001/");
        assert_eq!(api.url("/api/login"), "http://127.0.0.1:3001/api/login");
    }
}
