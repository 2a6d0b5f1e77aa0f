use brandhive_core::{AppError, AppResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Connection settings for the Brandhive backend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token attached to every request.
    pub bearer_token: Option<String>,
}

impl ApiConfig {
    /// Creates a config for an unauthenticated client.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// Attaches a bearer token to every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// Error payload shape returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Shared HTTP plumbing for the backend gateways.
///
/// The authorization gateways add no retry logic; a state-changing response
/// is authoritative and transport failures propagate to the caller.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub(crate) fn new(http: reqwest::Client, mut config: ApiConfig) -> Self {
        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }

        Self { http, config }
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        let builder = self.http.request(method, url);

        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send_for_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let response = Self::send(builder).await?;

        response
            .json::<T>()
            .await
            .map_err(|error| AppError::Internal(format!("malformed backend response: {error}")))
    }

    pub(crate) async fn send_for_empty(&self, builder: reqwest::RequestBuilder) -> AppResult<()> {
        Self::send(builder).await.map(|_| ())
    }

    async fn send(builder: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("backend request failed: {error}")))?;

        if response.status().is_success() {
            return Ok(response);
        }

        Err(Self::error_from_response(response).await)
    }

    /// Maps a non-success response onto an application error, carrying the
    /// backend's message verbatim.
    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map_or_else(|_| format!("backend returned status {status}"), |body| body.message);

        warn!(%status, message = message.as_str(), "backend rejected request");

        match status {
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::Validation(message)
            }
            reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            reqwest::StatusCode::FORBIDDEN => AppError::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => AppError::NotFound(message),
            reqwest::StatusCode::CONFLICT => AppError::Conflict(message),
            _ => AppError::Internal(format!("unexpected backend status {status}: {message}")),
        }
    }
}
