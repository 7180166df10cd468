//! `reqwest`-backed transport for the console backend.
//!
//! Owns the policy the session core delegates to transports: per-request
//! timeout and bounded exponential-backoff retry on retryable failures.

use crate::{ApiConfig, ApiError, AuthTransport, LoginCredentials, LoginGrant, SessionError};
use async_trait::async_trait;
use console_storage::Credential;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

/// Error payload shape the backend uses for failed requests.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Refresh endpoint response.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
}

/// Default transport implementation.
pub struct HttpTransport {
    http_client: Client,
    config: ApiConfig,
}

impl HttpTransport {
    /// Build a transport against the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, SessionError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SessionError::Config(format!("failed building HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn with_retry<T, F, Fut>(&self, label: &'static str, op: F) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.retry.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    if attempt + 1 < self.config.retry.max_attempts {
                        let delay = self.config.retry.delay_for_attempt(attempt);
                        debug!(
                            label,
                            attempt = attempt + 1,
                            max_attempts = self.config.retry.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "Retryable transport failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ApiError::Network(format!("{} made no attempts", label))))
    }
}

/// Convert a reqwest failure into the transport error taxonomy.
fn convert(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else if error.is_decode() {
        ApiError::Payload(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

fn parse_status_failure(status: u16, raw: String) -> ApiError {
    let body: ErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    ApiError::Status {
        status,
        code: body.code,
        message: body.message.unwrap_or(raw),
    }
}

/// Read a non-success response into a status failure.
async fn status_failure(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    parse_status_failure(status, raw)
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, ApiError> {
        self.with_retry("login", || async move {
            let url = self.endpoint("auth/login");
            debug!(url = %url, "Exchanging login credentials");

            let response = self
                .http_client
                .post(&url)
                .json(credentials)
                .send()
                .await
                .map_err(convert)?;

            if !response.status().is_success() {
                let error = status_failure(response).await;
                warn!(error = %error, "Login exchange failed");
                return Err(error);
            }

            response.json::<LoginGrant>().await.map_err(convert)
        })
        .await
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, ApiError> {
        self.with_retry("refresh", || async move {
            let response = self
                .http_client
                .post(self.endpoint("auth/refresh"))
                .bearer_auth(credential.as_str())
                .send()
                .await
                .map_err(convert)?;

            if !response.status().is_success() {
                let error = status_failure(response).await;
                warn!(error = %error, "Credential refresh rejected");
                return Err(error);
            }

            let data: RefreshResponse = response.json().await.map_err(convert)?;
            Ok(Credential::new(data.token))
        })
        .await
    }

    async fn validate_session(&self, credential: &Credential) -> Result<(), ApiError> {
        self.with_retry("validate_session", || async move {
            let response = self
                .http_client
                .get(self.endpoint("auth/session"))
                .bearer_auth(credential.as_str())
                .send()
                .await
                .map_err(convert)?;

            if !response.status().is_success() {
                return Err(status_failure(response).await);
            }
            Ok(())
        })
        .await
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        // No retry: callers treat this as fire-and-forget cleanup.
        let response = self
            .http_client
            .post(self.endpoint("auth/logout"))
            .bearer_auth(credential.as_str())
            .send()
            .await
            .map_err(convert)?;

        if !response.status().is_success() {
            return Err(status_failure(response).await);
        }
        Ok(())
    }
}
