//! Transport collaborator interfaces.

use crate::ApiError;
use async_trait::async_trait;
use console_storage::{Credential, UserProfile};
use serde::{Deserialize, Serialize};

/// Login request payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Result of a successful login exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    pub credential: Credential,
    pub profile: UserProfile,
}

/// The backend endpoints the session core consumes.
///
/// The core never sees business payloads; protected calls go through
/// [`crate::SessionManager::execute_protected`] with the caller's own
/// closure. Implementations own retry and timeout policy.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Exchange login credentials for a bearer credential and profile.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, ApiError>;

    /// Exchange the current credential for a fresh one. Safe to retry;
    /// the coordinator invokes it at most once per refresh cycle.
    async fn refresh(&self, credential: &Credential) -> Result<Credential, ApiError>;

    /// Lightweight authenticated read used to validate a cached session.
    async fn validate_session(&self, credential: &Credential) -> Result<(), ApiError>;

    /// Server-side logout. Best effort; failures never block local teardown.
    async fn logout(&self, credential: &Credential) -> Result<(), ApiError>;
}
