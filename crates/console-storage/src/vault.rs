//! High-level API for the session's two persisted entries.

use crate::{Credential, SessionStore, StorageKeys, StorageResult, UserProfile};
use tracing::warn;

/// Credential plus profile persistence for one session.
///
/// Reads fail open to logged-out: a storage failure or malformed entry is
/// reported as absent, never as an authenticated state.
pub struct CredentialVault {
    store: Box<dyn SessionStore>,
}

impl CredentialVault {
    /// Create a vault over the given storage backend.
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Store the bearer credential.
    pub fn set_credential(&self, token: &str) -> StorageResult<()> {
        self.store.set(StorageKeys::CREDENTIAL, token)
    }

    /// Retrieve the bearer credential, absent on any read failure.
    pub fn get_credential(&self) -> Option<Credential> {
        match self.store.get(StorageKeys::CREDENTIAL) {
            Ok(token) => token.map(Credential::new),
            Err(error) => {
                warn!(error = %error, "Failed reading credential, treating as absent");
                None
            }
        }
    }

    /// Delete the bearer credential.
    pub fn clear_credential(&self) -> StorageResult<()> {
        self.store.delete(StorageKeys::CREDENTIAL)?;
        Ok(())
    }

    /// Store the user profile as JSON.
    pub fn set_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        let json = serde_json::to_string(profile)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.store.set(StorageKeys::PROFILE, &json)
    }

    /// Retrieve the user profile, absent on any read failure or if the
    /// stored entry does not parse.
    pub fn get_profile(&self) -> Option<UserProfile> {
        let json = match self.store.get(StorageKeys::PROFILE) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(error) => {
                warn!(error = %error, "Failed reading profile, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(profile) => Some(profile),
            Err(error) => {
                warn!(error = %error, "Stored profile is malformed, treating as absent");
                None
            }
        }
    }

    /// Delete the user profile.
    pub fn clear_profile(&self) -> StorageResult<()> {
        self.store.delete(StorageKeys::PROFILE)?;
        Ok(())
    }

    /// Clear both entries. Per-key failures do not leave a usable partial
    /// session behind because reads of the surviving entry still require
    /// its counterpart.
    pub fn clear_all(&self) -> StorageResult<()> {
        let _ = self.store.delete(StorageKeys::CREDENTIAL);
        let _ = self.store.delete(StorageKeys::PROFILE);
        Ok(())
    }

    /// True when both credential and profile are present.
    pub fn has_session(&self) -> bool {
        self.get_credential().is_some() && self.get_profile().is_some()
    }
}
