//! Shared fixtures for session tests.
//!
//! Provides:
//! - Crafted bearer tokens with chosen expiries
//! - An in-memory `SessionStore`
//! - `MockTransport`: a scriptable transport with call counters and an
//!   optional gate that holds refresh calls open until the test releases
//!   them

use crate::{ApiError, AuthTransport, LoginCredentials, LoginGrant};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use console_storage::{
    Credential, CredentialVault, ProfileBase, SessionStore, StorageResult, UserProfile,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// An unsigned JWT-shaped token whose payload carries the given expiry.
pub(crate) fn token_with_exp(exp: i64) -> Credential {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
    Credential::new(format!("{}.{}.sig", header, payload))
}

/// A token expiring the given number of seconds from now.
pub(crate) fn token_expiring_in(secs: i64) -> Credential {
    token_with_exp(Utc::now().timestamp() + secs)
}

pub(crate) struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl SessionStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().unwrap().remove(key).is_some())
    }
}

pub(crate) fn memory_vault() -> CredentialVault {
    CredentialVault::new(Box::new(MemoryStore::new()))
}

pub(crate) fn admin_profile() -> UserProfile {
    UserProfile::Admin {
        base: ProfileBase {
            id: "admin-1".to_string(),
            email: "ops@example.com".to_string(),
            display_name: Some("Ops".to_string()),
        },
        permissions: vec!["vendors:write".to_string()],
    }
}

/// Scriptable transport with per-endpoint call counters.
pub(crate) struct MockTransport {
    pub(crate) login_calls: AtomicUsize,
    pub(crate) refresh_calls: AtomicUsize,
    pub(crate) validate_calls: AtomicUsize,
    pub(crate) logout_calls: AtomicUsize,
    login_result: Mutex<Result<LoginGrant, ApiError>>,
    refresh_result: Mutex<Result<Credential, ApiError>>,
    validate_result: Mutex<Result<(), ApiError>>,
    refresh_gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            validate_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            login_result: Mutex::new(Ok(LoginGrant {
                credential: token_expiring_in(3600),
                profile: admin_profile(),
            })),
            refresh_result: Mutex::new(Ok(token_expiring_in(3600))),
            validate_result: Mutex::new(Ok(())),
            refresh_gate: None,
        }
    }

    pub(crate) fn login_err(self, error: ApiError) -> Self {
        *self.login_result.lock().unwrap() = Err(error);
        self
    }

    pub(crate) fn refresh_ok(self, credential: Credential) -> Self {
        *self.refresh_result.lock().unwrap() = Ok(credential);
        self
    }

    pub(crate) fn refresh_err(self, error: ApiError) -> Self {
        *self.refresh_result.lock().unwrap() = Err(error);
        self
    }

    pub(crate) fn validate_err(self, error: ApiError) -> Self {
        *self.validate_result.lock().unwrap() = Err(error);
        self
    }

    /// Hold every refresh call open until the gate is notified.
    pub(crate) fn gate_refresh(mut self, gate: Arc<Notify>) -> Self {
        self.refresh_gate = Some(gate);
        self
    }

    /// Re-script the refresh outcome mid-test.
    pub(crate) fn set_refresh_ok(&self, credential: Credential) {
        *self.refresh_result.lock().unwrap() = Ok(credential);
    }
}

#[async_trait]
impl AuthTransport for MockTransport {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_result.lock().unwrap().clone()
    }

    async fn refresh(&self, _credential: &Credential) -> Result<Credential, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.refresh_gate {
            gate.notified().await;
        }
        self.refresh_result.lock().unwrap().clone()
    }

    async fn validate_session(&self, _credential: &Credential) -> Result<(), ApiError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validate_result.lock().unwrap().clone()
    }

    async fn logout(&self, _credential: &Credential) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
