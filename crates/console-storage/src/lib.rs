//! Durable session storage for the admin console client.
//!
//! This crate persists exactly two entries, the bearer credential and the
//! serialized user profile, behind a small storage trait so the session
//! core never touches the medium directly. The default backend is a JSON
//! document on disk; tests swap in an in-memory map.

mod credential;
mod file;
mod keys;
mod profile;
mod traits;
mod vault;

pub use credential::Credential;
pub use file::FileStore;
pub use keys::StorageKeys;
pub use profile::{ProfileBase, UserProfile};
pub use traits::SessionStore;
pub use vault::CredentialVault;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Storage medium failure (unwritable path, rename failure, ...)
    #[error("Storage medium error: {0}")]
    Medium(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Open a vault backed by the default on-disk store.
pub fn open_default_vault() -> StorageResult<CredentialVault> {
    let store = FileStore::open(FileStore::default_path()?)?;
    Ok(CredentialVault::new(Box::new(store)))
}
