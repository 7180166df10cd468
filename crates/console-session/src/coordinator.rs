//! Single-flight credential refresh coordination.
//!
//! One coordinator exists per session. Any number of callers may discover
//! an expiring credential concurrently; the first performs the refresh
//! call and everyone else joins its outcome through a queued completion
//! handle. The queue is drained exactly once per cycle and is empty after
//! every settle, success or failure.

use crate::{token, AuthTransport, SessionError};
use chrono::Utc;
use console_storage::{Credential, CredentialVault};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

type WaiterResult = Result<Credential, SessionError>;

/// Refresh protocol state. The mutex around this is only ever held for
/// short critical sections, never across an await.
enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<WaiterResult>>,
    },
}

/// Single-flight refresh coordinator.
pub struct RefreshCoordinator {
    vault: Arc<CredentialVault>,
    transport: Arc<dyn AuthTransport>,
    state: Mutex<RefreshState>,
    /// Bumped on teardown so a refresh that settles afterwards cannot
    /// write its result into a cleared vault.
    epoch: AtomicU64,
}

impl RefreshCoordinator {
    /// Create a coordinator over the session's vault and transport.
    pub fn new(vault: Arc<CredentialVault>, transport: Arc<dyn AuthTransport>) -> Self {
        Self {
            vault,
            transport,
            state: Mutex::new(RefreshState::Idle),
            epoch: AtomicU64::new(0),
        }
    }

    /// Return a credential usable for a protected call, refreshing first
    /// if the stored one is inside the refresh horizon.
    ///
    /// Returns `Ok(None)` when no credential is stored. The common case,
    /// a credential comfortably outside the horizon, returns it without
    /// touching the refresh state or the network.
    pub async fn ensure_fresh(&self) -> Result<Option<Credential>, SessionError> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        let Some(current) = self.vault.get_credential() else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if !token::needs_refresh(&current, now) {
            return Ok(Some(current));
        }

        // Start the one refresh call, or join the one already in flight.
        let receiver = {
            let mut state = self.state.lock().unwrap();
            match &mut *state {
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing {
                        waiters: Vec::new(),
                    };
                    None
                }
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
            }
        };

        match receiver {
            None => self.run_refresh(&current, epoch).await.map(Some),
            Some(rx) => match rx.await {
                Ok(result) => result.map(Some),
                // Sender dropped without settling; only possible if the
                // coordinator itself was dropped mid-refresh.
                Err(_) => Err(SessionError::RefreshCancelled),
            },
        }
    }

    /// Reject every queued waiter and invalidate the in-flight refresh.
    ///
    /// Called on session teardown. The transport call itself is not
    /// interrupted; when it settles it observes the epoch change and
    /// reports cancellation instead of persisting into the cleared vault.
    /// No waiter is left pending.
    pub fn drain(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let waiters = self.take_waiters();
        if !waiters.is_empty() {
            debug!(
                count = waiters.len(),
                "Rejecting queued refresh waiters on teardown"
            );
        }
        for waiter in waiters {
            let _ = waiter.send(Err(SessionError::RefreshCancelled));
        }
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<WaiterResult>> {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        }
    }

    /// Perform the one refresh network call and fan its outcome out to
    /// every waiter that arrived while it was in flight.
    async fn run_refresh(
        &self,
        current: &Credential,
        epoch: u64,
    ) -> Result<Credential, SessionError> {
        debug!("Credential inside refresh horizon, refreshing");

        let outcome = self.transport.refresh(current).await;

        // Drained by teardown while the call was in flight?
        let cancelled = self.epoch.load(Ordering::SeqCst) != epoch;
        let waiters = self.take_waiters();

        if cancelled {
            debug!("Refresh settled after teardown, discarding result");
            for waiter in waiters {
                let _ = waiter.send(Err(SessionError::RefreshCancelled));
            }
            return Err(SessionError::RefreshCancelled);
        }

        match outcome {
            Ok(fresh) => {
                if let Err(error) = self.vault.set_credential(fresh.as_str()) {
                    warn!(error = %error, "Failed persisting refreshed credential");
                    let message = error.to_string();
                    for waiter in waiters {
                        let _ = waiter.send(Err(SessionError::PersistFailed(message.clone())));
                    }
                    return Err(SessionError::PersistFailed(message));
                }

                info!(waiters = waiters.len(), "Credential refreshed");
                for waiter in waiters {
                    let _ = waiter.send(Ok(fresh.clone()));
                }
                Ok(fresh)
            }
            Err(error) => {
                warn!(error = %error, "Credential refresh failed");
                for waiter in waiters {
                    let _ = waiter.send(Err(SessionError::RefreshFailed(error.clone())));
                }
                Err(SessionError::RefreshFailed(error))
            }
        }
    }
}
