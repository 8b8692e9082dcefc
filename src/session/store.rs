//! Session/token store
//!
//! Holds the signed-in user together with the access/refresh token pair and
//! writes every change through to [`DurableStorage`]. The user and the token
//! pair are only ever set or cleared together.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::hooks::SessionHooks;
use super::storage::{DurableStorage, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};
use crate::api::auth::{AuthApi, AuthResponse};
use crate::api::client::TokenProvider;
use crate::error::{ApiError, ApiResult};
use crate::models::{Session, User};

#[derive(Debug, Clone, Default)]
struct SessionState {
    current: Option<(User, Session)>,
}

pub struct SessionStore {
    auth: AuthApi,
    storage: Arc<dyn DurableStorage>,
    hooks: Arc<SessionHooks>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current_user().map(|u| u.email))
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl SessionStore {
    /// Load whatever session storage holds, without validating it yet.
    ///
    /// A partial session (user without tokens, or the reverse) is discarded.
    pub fn new(auth: AuthApi, storage: Arc<dyn DurableStorage>, hooks: Arc<SessionHooks>) -> Self {
        let current = load_session(storage.as_ref());
        if current.is_none() && has_any_key(storage.as_ref()) {
            tracing::warn!("Discarding incomplete stored session");
            if let Err(e) = clear_storage(storage.as_ref()) {
                tracing::warn!("Failed to clear stored session: {:#}", e);
            }
        }
        Self {
            auth,
            storage,
            hooks,
            state: Mutex::new(SessionState { current }),
        }
    }

    pub fn hooks(&self) -> &Arc<SessionHooks> {
        &self.hooks
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().current.as_ref().map(|(user, _)| user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().current.is_some()
    }

    /// Cached access token, not validated
    pub fn access_token(&self) -> Option<String> {
        self.lock()
            .current
            .as_ref()
            .map(|(_, s)| s.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock()
            .current
            .as_ref()
            .map(|(_, s)| s.refresh_token.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Exchange a Google credential for a session.
    ///
    /// On failure the previous session (if any) is left as it was.
    pub async fn login(&self, credential: &str) -> ApiResult<User> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ApiError::Validation("A Google credential is required".to_string()));
        }
        let response = self.auth.google(credential).await?;
        tracing::info!("Signed in as {}", response.user.email);
        self.commit(&response)?;
        Ok(response.user)
    }

    /// Validate the stored session at startup.
    ///
    /// Returns the signed-in user, or `None` once the session is gone.
    pub async fn restore(&self) -> Option<User> {
        let token = self.access_token()?;
        match self.auth.me(&token).await {
            Ok(user) => {
                let mut state = self.lock();
                if let Some((cached, _)) = state.current.as_mut() {
                    *cached = user.clone();
                }
                drop(state);
                if let Ok(raw) = serde_json::to_string(&user) {
                    if let Err(e) = self.storage.set(USER_KEY, raw) {
                        tracing::warn!("Failed to persist user: {:#}", e);
                    }
                }
                Some(user)
            }
            Err(e) => {
                tracing::debug!("Stored token rejected ({}), refreshing", e);
                self.refresh().await.ok()?;
                self.current_user()
            }
        }
    }

    /// A token the backend currently accepts, refreshing if needed.
    /// `None` means signed out.
    pub async fn get_valid_access_token(&self) -> Option<String> {
        let token = self.access_token()?;
        if self.auth.me(&token).await.is_ok() {
            return Some(token);
        }
        self.refresh()
            .await
            .ok()
            .map(|session| session.access_token)
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// Any failure ends the session.
    pub async fn refresh(&self) -> ApiResult<Session> {
        let Some(refresh_token) = self.refresh_token() else {
            self.end_session();
            return Err(ApiError::Unauthorized("No refresh token".to_string()));
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(response) => {
                tracing::debug!("Session refreshed");
                self.commit(&response)?;
                Ok(response.session())
            }
            Err(e) => {
                tracing::info!("Session refresh failed, signing out: {}", e);
                self.end_session();
                Err(ApiError::Unauthorized(format!("Session expired: {}", e)))
            }
        }
    }

    /// Tell the backend (best effort), then forget the session locally
    pub async fn logout(&self) {
        if let Some(token) = self.access_token() {
            if let Err(e) = self.auth.logout(&token).await {
                tracing::debug!("Logout call failed, clearing locally anyway: {}", e);
            }
        }
        self.end_session();
        tracing::info!("Signed out");
    }

    fn commit(&self, response: &AuthResponse) -> ApiResult<()> {
        let user_json = serde_json::to_string(&response.user)?;
        let mut state = self.lock();
        state.current = Some((response.user.clone(), response.session()));
        self.storage
            .apply(&[
                (TOKEN_KEY, Some(response.access_token.clone())),
                (REFRESH_TOKEN_KEY, Some(response.refresh_token.clone())),
                (USER_KEY, Some(user_json)),
            ])
            .map_err(ApiError::Other)
    }

    /// Clear memory and storage, then notify subscribers
    fn end_session(&self) {
        let was_signed_in = {
            let mut state = self.lock();
            state.current.take().is_some()
        };
        if let Err(e) = clear_storage(self.storage.as_ref()) {
            tracing::warn!("Failed to clear stored session: {:#}", e);
        }
        if was_signed_in {
            self.hooks.fire_logout();
        }
    }
}

#[async_trait]
impl TokenProvider for SessionStore {
    async fn bearer_token(&self) -> Option<String> {
        self.access_token()
    }

    async fn refreshed_token(&self) -> Option<String> {
        self.refresh().await.ok().map(|s| s.access_token)
    }
}

fn load_session(storage: &dyn DurableStorage) -> Option<(User, Session)> {
    let access_token = storage.get(TOKEN_KEY)?;
    let refresh_token = storage.get(REFRESH_TOKEN_KEY)?;
    let user: User = serde_json::from_str(&storage.get(USER_KEY)?).ok()?;
    Some((
        user,
        Session {
            access_token,
            refresh_token,
        },
    ))
}

fn has_any_key(storage: &dyn DurableStorage) -> bool {
    [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY]
        .iter()
        .any(|k| storage.get(k).is_some())
}

fn clear_storage(storage: &dyn DurableStorage) -> anyhow::Result<()> {
    storage.apply(&[(TOKEN_KEY, None), (REFRESH_TOKEN_KEY, None), (USER_KEY, None)])
}
