//! Session facade for the console UI layer.
//!
//! Owns the externally observable session state and wires the refresh
//! coordinator, the bootstrapper, and outcome classification together.
//! There is exactly one `SessionManager` (and so one coordinator) per
//! session; the UI layer drives every protected call through
//! [`SessionManager::execute_protected`].

use crate::bootstrap::{self, RestoreOutcome};
use crate::classify::{classify, FailureClass};
use crate::coordinator::RefreshCoordinator;
use crate::{ApiError, AuthTransport, LoginCredentials, SessionError};
use console_storage::{Credential, CredentialVault, UserProfile};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Session lifecycle events delivered to the subscriber callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login or bootstrap produced a validated authenticated session.
    Established,
    /// Bootstrap kept a cached session without reaching the backend.
    EstablishedDegraded,
    /// The session ended (logout or auth-fatal failure).
    Terminated,
}

/// Callback type for session lifecycle notifications.
pub type SessionEventCallback = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// Externally observable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    /// True only after a degraded restore, until the next successful
    /// protected call or login.
    pub degraded: bool,
    pub profile: Option<UserProfile>,
}

struct SessionFlags {
    authenticated: bool,
    degraded: bool,
}

/// Session manager with single-flight refresh and classified teardown.
pub struct SessionManager {
    vault: Arc<CredentialVault>,
    transport: Arc<dyn AuthTransport>,
    coordinator: RefreshCoordinator,
    flags: Mutex<SessionFlags>,
    event_callback: Mutex<Option<SessionEventCallback>>,
}

impl SessionManager {
    /// Create a session manager over the given vault and transport.
    pub fn new(vault: CredentialVault, transport: Arc<dyn AuthTransport>) -> Self {
        let vault = Arc::new(vault);
        let coordinator = RefreshCoordinator::new(vault.clone(), transport.clone());

        Self {
            vault,
            transport,
            coordinator,
            flags: Mutex::new(SessionFlags {
                authenticated: false,
                degraded: false,
            }),
            event_callback: Mutex::new(None),
        }
    }

    /// Build a manager against the default HTTP transport and the default
    /// on-disk vault.
    pub fn with_defaults(config: crate::ApiConfig) -> Result<Self, SessionError> {
        let vault = console_storage::open_default_vault()?;
        let transport = crate::HttpTransport::new(config)?;
        Ok(Self::new(vault, Arc::new(transport)))
    }

    /// Set a callback to be notified of session lifecycle events.
    pub fn set_event_callback(&self, callback: SessionEventCallback) {
        let mut cb = self.event_callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// True when the session holds both a credential and a profile.
    pub fn is_authenticated(&self) -> bool {
        self.flags.lock().unwrap().authenticated
    }

    /// The cached profile of the authenticated principal.
    pub fn current_profile(&self) -> Option<UserProfile> {
        if !self.is_authenticated() {
            return None;
        }
        self.vault.get_profile()
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let (authenticated, degraded) = {
            let flags = self.flags.lock().unwrap();
            (flags.authenticated, flags.degraded)
        };
        SessionSnapshot {
            authenticated,
            degraded,
            profile: if authenticated {
                self.vault.get_profile()
            } else {
                None
            },
        }
    }

    /// Restore the persisted session once at process start.
    pub async fn restore(&self) -> Result<RestoreOutcome, SessionError> {
        let outcome = bootstrap::run(&self.vault, &self.transport).await?;

        match &outcome {
            RestoreOutcome::Restored => {
                self.set_flags(true, false);
                self.emit(SessionEvent::Established);
            }
            RestoreOutcome::Degraded(_) => {
                self.set_flags(true, true);
                self.emit(SessionEvent::EstablishedDegraded);
            }
            RestoreOutcome::Cleared => {
                self.set_flags(false, false);
            }
        }

        Ok(outcome)
    }

    /// Exchange login credentials for a session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), SessionError> {
        let grant = match self.transport.login(credentials).await {
            Ok(grant) => grant,
            Err(error) => {
                warn!(error = %error, "Login failed");
                return Err(SessionError::LoginFailed(error));
            }
        };

        // Credential and profile are written together; a failure between
        // the two rolls back so no partial session persists.
        self.vault.set_credential(grant.credential.as_str())?;
        if let Err(error) = self.vault.set_profile(&grant.profile) {
            let _ = self.vault.clear_all();
            return Err(error.into());
        }

        self.set_flags(true, false);
        info!(role = grant.profile.role(), "Login successful");
        self.emit(SessionEvent::Established);
        Ok(())
    }

    /// Synchronous local teardown plus best-effort server notification.
    pub fn logout(&self) {
        let credential = self.vault.get_credential();

        self.terminate();

        if let Some(credential) = credential {
            let transport = self.transport.clone();
            tokio::spawn(async move {
                if let Err(error) = transport.logout(&credential).await {
                    debug!(error = %error, "Server-side logout failed");
                }
            });
        }
    }

    /// Return a credential usable for a protected call, refreshing first
    /// if needed. `Ok(None)` when signed out.
    pub async fn ensure_fresh_credential(&self) -> Result<Option<Credential>, SessionError> {
        self.coordinator.ensure_fresh().await
    }

    /// Run one protected call: refresh-check, execute, classify.
    ///
    /// An auth-fatal outcome, from the refresh or from the call itself,
    /// triggers the idempotent teardown and surfaces as
    /// [`SessionError::Terminated`]; everything else leaves the session
    /// untouched.
    pub async fn execute_protected<T, F, Fut>(&self, call: F) -> Result<T, SessionError>
    where
        F: FnOnce(Credential) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let credential = match self.coordinator.ensure_fresh().await {
            Ok(Some(credential)) => credential,
            Ok(None) => return Err(SessionError::NotAuthenticated),
            Err(SessionError::RefreshFailed(error)) => {
                return match classify(&error) {
                    FailureClass::AuthFatal => {
                        warn!(error = %error, "Refresh rejected the credential, ending session");
                        self.terminate();
                        Err(SessionError::Terminated(error))
                    }
                    FailureClass::Transient => Err(SessionError::RefreshFailed(error)),
                };
            }
            Err(error) => return Err(error),
        };

        match call(credential).await {
            Ok(value) => {
                // A successful protected call ends any degraded grace period.
                let mut flags = self.flags.lock().unwrap();
                if flags.degraded {
                    flags.degraded = false;
                }
                Ok(value)
            }
            Err(error) => match classify(&error) {
                FailureClass::AuthFatal => {
                    warn!(error = %error, "Protected call failed with auth-fatal outcome");
                    self.terminate();
                    Err(SessionError::Terminated(error))
                }
                FailureClass::Transient => Err(SessionError::Request(error)),
            },
        }
    }

    /// Idempotent teardown: clear the vault, reject queued refresh
    /// waiters, flip the observable state, and notify subscribers once.
    fn terminate(&self) {
        let was_authenticated = {
            let mut flags = self.flags.lock().unwrap();
            let was = flags.authenticated;
            flags.authenticated = false;
            flags.degraded = false;
            was
        };

        self.coordinator.drain();
        if let Err(error) = self.vault.clear_all() {
            warn!(error = %error, "Failed clearing vault during teardown");
        }

        if was_authenticated {
            info!("Session terminated");
            self.emit(SessionEvent::Terminated);
        }
    }

    fn set_flags(&self, authenticated: bool, degraded: bool) {
        let mut flags = self.flags.lock().unwrap();
        flags.authenticated = authenticated;
        flags.degraded = degraded;
    }

    fn emit(&self, event: SessionEvent) {
        let cb = self.event_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(event);
        }
    }
}
