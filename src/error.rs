//! Typed errors for backend API operations
//!
//! Lets callers tell an expired session apart from a validation problem or a
//! flaky network without string matching.

use thiserror::Error;

/// Backend API errors with typed variants
///
/// - `Unauthorized` (401) - token missing/expired; one refresh + retry is allowed
/// - `NotFound` (404) - the resource does not exist (deleted list, unknown profile)
/// - `BadRequest` (400/422) - malformed request; caller error
/// - `ServiceError` (5xx) - backend failure
/// - `Network` - connection/timeout
/// - `Validation` - rejected locally before any request was issued
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication token is expired or invalid (HTTP 401), or the session
    /// could not be refreshed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    /// Network connectivity issue (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Input rejected client-side; no network call was made
    #[error("{0}")]
    Validation(String),

    /// Any other non-2xx status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Check if this error means the session is no longer usable
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Check if a later retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ServiceError(_) | ApiError::Network(_))
    }

    /// Convert HTTP status code and response body into a typed ApiError.
    ///
    /// The backend reports failures as `{"detail": "..."}` (FastAPI) and
    /// occasionally `{"message": "..."}`; that text is preferred over the raw
    /// body when present.
    pub fn from_http_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = backend_message(&body).unwrap_or(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            400 | 422 => ApiError::BadRequest(message),
            500..=599 => ApiError::ServiceError(message),
            code => ApiError::Http {
                status: code,
                message,
            },
        }
    }

    /// Convert network/connection errors into typed ApiError
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            ApiError::Network(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else {
            ApiError::Other(e.into())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let field = value.get("detail").or_else(|| value.get("message"))?;
    match field {
        serde_json::Value::String(s) => Some(s.clone()),
        // FastAPI validation errors come back as a list of objects
        other => Some(other.to_string()),
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
