//! Session restore at process start.
//!
//! Runs once per process: reads the vault, validates the cached credential
//! against the backend, and decides whether to restore, clear, or keep the
//! session provisionally. The decision is an explicit finite state machine
//! so the terminal states are enumerable and testable.
//!
//! ## State Diagram
//!
//! ```text
//! ┌──────────────┐
//! │   Checking   │ (initial)
//! └──────┬───────┘
//!        │ MissingSession / CredentialRejected ──► Cleared
//!        │ ValidationPassed ───────────────────► Restored
//!        │ BackendUnreachable ─────────────────► Degraded
//! ```
//!
//! All three outcomes are terminal. A transient validation failure keeps
//! the cached session (`Degraded`) so a backend blip does not evict a
//! legitimate operator; the next protected call re-validates naturally.

use crate::classify::{classify, FailureClass};
use crate::{ApiError, AuthTransport, SessionError};
use console_storage::CredentialVault;
use rust_fsm::*;
use std::sync::Arc;
use tracing::{info, warn};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub restore_machine(Checking)

    Checking => {
        MissingSession => Cleared,
        ValidationPassed => Restored,
        CredentialRejected => Cleared,
        BackendUnreachable => Degraded
    }
}

// Re-export the generated types with clearer names
pub use restore_machine::Input as RestoreInput;
pub use restore_machine::State as RestoreState;
pub use restore_machine::StateMachine as RestoreMachine;

/// Terminal outcome of the startup restore pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Cached credential and profile validated against the backend.
    Restored,
    /// No usable cached session; starting signed out.
    Cleared,
    /// Backend unreachable; cached session kept provisionally. Carries
    /// the validation failure so the UI can surface a non-blocking
    /// connectivity warning.
    Degraded(ApiError),
}

/// Read the vault, probe the backend once, and settle the machine.
pub(crate) async fn run(
    vault: &CredentialVault,
    transport: &Arc<dyn AuthTransport>,
) -> Result<RestoreOutcome, SessionError> {
    let mut machine = RestoreMachine::new();

    let credential = vault.get_credential();
    let profile = vault.get_profile();
    let credential = match (credential, profile) {
        (Some(credential), Some(_)) => credential,
        _ => {
            info!("No cached session found on startup");
            advance(&mut machine, &RestoreInput::MissingSession);
            return Ok(RestoreOutcome::Cleared);
        }
    };

    match transport.validate_session(&credential).await {
        Ok(()) => {
            info!("Cached session validated with backend");
            advance(&mut machine, &RestoreInput::ValidationPassed);
            Ok(RestoreOutcome::Restored)
        }
        Err(error) => match classify(&error) {
            FailureClass::AuthFatal => {
                warn!(error = %error, "Backend rejected cached credential, clearing session");
                vault.clear_all()?;
                advance(&mut machine, &RestoreInput::CredentialRejected);
                Ok(RestoreOutcome::Cleared)
            }
            FailureClass::Transient => {
                warn!(
                    error = %error,
                    "Backend unreachable during restore, keeping cached session"
                );
                advance(&mut machine, &RestoreInput::BackendUnreachable);
                Ok(RestoreOutcome::Degraded(error))
            }
        },
    }
}

fn advance(machine: &mut RestoreMachine, input: &RestoreInput) {
    // Every input here is valid from Checking and fires exactly once.
    if machine.consume(input).is_err() {
        warn!(input = ?input, state = ?machine.state(), "Impossible restore transition");
    }
}
