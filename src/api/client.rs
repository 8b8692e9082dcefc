//! Shared HTTP plumbing for every backend resource wrapper
//!
//! Attaches the bearer token, retries exactly once after a 401 with a
//! freshly refreshed token, maps non-2xx responses to [`ApiError`] and
//! normalizes identities on the way in.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::normalize;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Source of bearer tokens for authenticated calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Token to attach to the next request, if signed in
    async fn bearer_token(&self) -> Option<String>;

    /// Force a refresh after the backend rejected `bearer_token()`.
    /// `None` means the session is gone.
    async fn refreshed_token(&self) -> Option<String>;
}

/// Whether a call needs a bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    Bearer,
}

/// Query string as ordered pairs; repeating a key is allowed and meaningful
pub type Query = Vec<(String, String)>;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            tokens: None,
        }
    }

    /// Same client, with bearer tokens supplied by `tokens`
    pub fn with_tokens(&self, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens: Some(tokens),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request built by `build`, handling auth and the single 401 retry.
    ///
    /// `build` may be called twice, so it must not consume anything.
    pub async fn execute<F>(&self, auth: Auth, build: F) -> ApiResult<Response>
    where
        F: Fn(&reqwest::Client, Option<&str>) -> RequestBuilder,
    {
        let tokens = match auth {
            Auth::None => None,
            Auth::Bearer => Some(self.tokens.as_ref().ok_or_else(|| {
                ApiError::Unauthorized("No session available for this client".to_string())
            })?),
        };

        let token = match tokens {
            Some(tokens) => Some(
                tokens
                    .bearer_token()
                    .await
                    .ok_or_else(|| ApiError::Unauthorized("Not signed in".to_string()))?,
            ),
            None => None,
        };

        let response = build(&self.http, token.as_deref())
            .send()
            .await
            .map_err(ApiError::from_network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(tokens) = tokens {
                tracing::debug!("Got 401, refreshing session and retrying once");
                let fresh = tokens.refreshed_token().await.ok_or_else(|| {
                    ApiError::Unauthorized("Session expired, please sign in again".to_string())
                })?;
                let retry = build(&self.http, Some(&fresh))
                    .send()
                    .await
                    .map_err(ApiError::from_network_error)?;
                return check_status(retry).await;
            }
        }

        check_status(response).await
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        auth: Auth,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let timeout = self.timeout;
        let response = self
            .execute(auth, |http, token| {
                bearer(http.get(&url).query(query).timeout(timeout), token)
            })
            .await?;
        decode_body(response).await
    }

    /// Send a JSON body and decode a JSON response
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let timeout = self.timeout;
        let response = self
            .execute(auth, |http, token| {
                bearer(
                    http.request(method.clone(), &url).json(body).timeout(timeout),
                    token,
                )
            })
            .await?;
        decode_body(response).await
    }

    /// Send a request whose response body is irrelevant (DELETE, logout)
    pub async fn send_empty(&self, method: Method, path: &str, auth: Auth) -> ApiResult<()> {
        let url = self.url(path);
        let timeout = self.timeout;
        self.execute(auth, |http, token| {
            bearer(http.request(method.clone(), &url).timeout(timeout), token)
        })
        .await?;
        Ok(())
    }

    /// POST a JSON body and hand back the raw response for incremental reading.
    /// No overall timeout is applied; streams may legitimately run long.
    pub async fn open_stream<B>(&self, path: &str, body: &B, auth: Auth) -> ApiResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path);
        self.execute(auth, |http, token| bearer(http.post(&url).json(body), token))
            .await
    }
}

fn bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_http_status(status, body))
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let value: Value = response
        .json()
        .await
        .map_err(ApiError::from_network_error)?;
    normalize::decode(value)
}
