//! `/auth` endpoints
//!
//! These calls manage the session itself, so they never go through the
//! token provider: each one carries whatever credential it was handed.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, Auth};
use crate::error::ApiResult;
use crate::models::{Session, User};

/// Token pair plus the user it belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl AuthResponse {
    pub fn session(&self) -> Session {
        Session {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    credential: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange a Google ID token for a session
    pub async fn google(&self, credential: &str) -> ApiResult<AuthResponse> {
        self.client
            .send_json(
                Method::POST,
                "/auth/google",
                &GoogleRequest { credential },
                Auth::None,
            )
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<AuthResponse> {
        self.client
            .send_json(
                Method::POST,
                "/auth/refresh",
                &RefreshRequest { refresh_token },
                Auth::None,
            )
            .await
    }

    /// Validate `access_token`; a 401 comes back as `ApiError::Unauthorized`
    pub async fn me(&self, access_token: &str) -> ApiResult<User> {
        let url = self.client.url("/auth/me");
        let response = self
            .client
            .execute(Auth::None, |http, _| http.get(&url).bearer_auth(access_token))
            .await?;
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(crate::error::ApiError::from_network_error)?;
        super::normalize::decode(value)
    }

    pub async fn logout(&self, access_token: &str) -> ApiResult<()> {
        let url = self.client.url("/auth/logout");
        self.client
            .execute(Auth::None, |http, _| http.post(&url).bearer_auth(access_token))
            .await?;
        Ok(())
    }
}
